//! Level state and core simulation types
//!
//! Everything a running level needs lives here; score and completion flags
//! belong to the session's `Progress` and are reached through `Services`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use crate::consts::*;
use crate::scene::LevelId;
use crate::secs_to_ticks;
use crate::tuning::Tuning;

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Active gameplay
    Playing,
    /// Every enemy gone
    Cleared,
    /// Lives ran out
    PlayerDead,
}

/// Something the host may want to react to (sound, HUD flash, scene change)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Fired { shooter: EntityKind },
    Destroyed { kind: EntityKind, pos: Vec2 },
    ScoreAwarded { points: u64 },
    LifeLost { lives: i32 },
    EnemyBreached { id: u32 },
    LevelCleared(LevelId),
    PlayerDied,
}

/// Per-kind behavior data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Player ship
    Pilot {
        /// Earliest tick the next volley may fire
        next_fire_tick: u64,
        /// Sprite facing sign (+1 right, -1 left)
        facing: f32,
    },
    /// Enemy ship oscillating around its spawn column
    Oscillate {
        start_x: f32,
        direction: f32,
        fire_timer: f32,
        score_value: u64,
    },
    /// Shot travelling at constant velocity
    Projectile { expires_at: Option<u64> },
    /// Rocks and boundaries
    Inert,
}

/// A simulated entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half_extents: Vec2,
    /// Hits left; destroyed once it drops below zero
    pub health: i32,
    pub behavior: Behavior,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2) -> Self {
        let half_extents = match kind {
            EntityKind::Player => Vec2::splat(PLAYER_HALF_SIZE),
            EntityKind::Enemy => Vec2::splat(ENEMY_HALF_SIZE),
            EntityKind::Rock => Vec2::splat(ROCK_HALF_SIZE),
            EntityKind::PlayerAmmo | EntityKind::HostileAmmo => {
                Vec2::new(AMMO_HALF_WIDTH, AMMO_HALF_HEIGHT)
            }
            EntityKind::EndZone => Vec2::new(PLAYFIELD_HALF_WIDTH + 2.0, END_ZONE_HALF_HEIGHT),
        };
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            half_extents,
            health: 0,
            behavior: Behavior::Inert,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.pos - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.half_extents
    }

    /// Whether the hit counter has crossed the destruction threshold
    pub fn is_doomed(&self) -> bool {
        self.kind.is_destructible() && self.health < 0
    }
}

/// A timed explosion effect (visual only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub expires_at: u64,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Complete state of one running level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelState {
    pub level: LevelId,
    pub rng_state: RngState,
    pub tuning: Tuning,
    pub lives: i32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: LevelPhase,
    /// Live entities (sorted by id for determinism)
    pub entities: Vec<Entity>,
    pub explosions: Vec<Explosion>,
    /// Pairs (lower id first) that were touching after the previous tick
    pub(crate) contacts: Vec<(u32, u32)>,
    next_id: u32,
}

impl LevelState {
    /// Empty level with just the player and the end zone
    pub fn empty(level: LevelId, tuning: &Tuning, seed: u64) -> Self {
        let mut state = Self {
            level,
            rng_state: RngState::new(seed),
            tuning: tuning.clone(),
            lives: tuning.starting_lives,
            time_ticks: 0,
            phase: LevelPhase::Playing,
            entities: Vec::new(),
            explosions: Vec::new(),
            contacts: Vec::new(),
            next_id: 1,
        };
        state.spawn_player(Vec2::new(0.0, PLAYER_ROW_Y));
        state.spawn(EntityKind::EndZone, Vec2::new(0.0, END_ZONE_Y));
        state
    }

    /// Level populated from its layout
    pub fn new(level: LevelId, tuning: &Tuning, seed: u64) -> Self {
        let mut state = Self::empty(level, tuning, seed);
        super::level::populate(&mut state);
        log::info!(
            "{} ready: {} enemies, {} rocks",
            level,
            state.count(EntityKind::Enemy),
            state.count(EntityKind::Rock)
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn an entity with kind defaults and return its id
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity::new(id, kind, pos));
        id
    }

    pub fn spawn_player(&mut self, pos: Vec2) -> u32 {
        let id = self.spawn(EntityKind::Player, pos);
        if let Some(player) = self.entity_mut(id) {
            player.behavior = Behavior::Pilot {
                next_fire_tick: 0,
                facing: 1.0,
            };
        }
        id
    }

    pub fn spawn_enemy(&mut self, pos: Vec2) -> u32 {
        let health = self.tuning.enemy_health;
        let score_value = self.tuning.enemy_score;
        let id = self.spawn(EntityKind::Enemy, pos);
        if let Some(enemy) = self.entity_mut(id) {
            enemy.health = health;
            enemy.behavior = Behavior::Oscillate {
                start_x: pos.x,
                direction: 1.0,
                fire_timer: 0.0,
                score_value,
            };
        }
        id
    }

    pub fn spawn_rock(&mut self, pos: Vec2, health: i32) -> u32 {
        let id = self.spawn(EntityKind::Rock, pos);
        if let Some(rock) = self.entity_mut(id) {
            rock.health = health;
        }
        id
    }

    /// Spawn a shot; friendly shots self-destruct after the configured lifetime
    pub fn spawn_ammo(&mut self, kind: EntityKind, pos: Vec2) -> u32 {
        let (vel, expires_at) = match kind {
            EntityKind::PlayerAmmo => (
                Vec2::new(0.0, self.tuning.player_ammo_speed),
                Some(self.time_ticks + secs_to_ticks(self.tuning.player_ammo_lifetime)),
            ),
            _ => (Vec2::new(0.0, -self.tuning.hostile_ammo_speed), None),
        };
        let id = self.spawn(kind, pos);
        if let Some(shot) = self.entity_mut(id) {
            shot.vel = vel;
            shot.behavior = Behavior::Projectile { expires_at };
        }
        id
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.kind == EntityKind::Player)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    /// Enemies still alive (the level clears when this reaches zero)
    pub fn enemies_remaining(&self) -> usize {
        self.count(EntityKind::Enemy)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }
}
