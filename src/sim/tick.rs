//! Fixed timestep simulation tick
//!
//! One call advances a level by one step. Order within a step:
//! 1. destruction check (hit counters below zero from earlier steps)
//! 2. player, enemies, shots
//! 3. expiries
//! 4. collision events for contacts that started this step
//! 5. lose / clear evaluation

use glam::Vec2;

use super::collision::{new_contacts, overlapping_pairs, ray_blocked};
use super::kind::{EntityKind, Reaction, reaction};
use super::state::{Behavior, Explosion, GameEvent, LevelPhase, LevelState};
use crate::audio::AudioManager;
use crate::consts::*;
use crate::progress::Progress;
use crate::secs_to_ticks;

/// Session services the simulation writes through
pub struct Services<'a> {
    pub progress: &'a mut Progress,
    pub audio: &'a mut AudioManager,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal axis, -1.0 (left) to 1.0 (right)
    pub horizontal: f32,
    /// Fire pressed this step; still gated by the fire rate
    pub fire: bool,
    /// Pause toggle (consumed by the session before ticking)
    pub pause: bool,
    /// Demo mode - the player ship flies itself
    pub autopilot: bool,
}

/// Advance the level by one fixed timestep
pub fn tick(
    state: &mut LevelState,
    services: &mut Services<'_>,
    input: &TickInput,
    dt: f32,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != LevelPhase::Playing {
        return events;
    }

    state.time_ticks += 1;

    destroy_doomed(state, services, &mut events);

    let input = if input.autopilot {
        autopilot_input(state)
    } else {
        input.clone()
    };

    update_player(state, services, &input, dt, &mut events);
    update_enemies(state, services, dt, &mut events);

    // Shots fly in a straight line
    for entity in state.entities.iter_mut() {
        if entity.kind.is_ammo() {
            entity.pos += entity.vel * dt;
        }
    }

    // Friendly shots self-destruct; explosions fade
    let now = state.time_ticks;
    state.entities.retain(|e| match e.behavior {
        Behavior::Projectile {
            expires_at: Some(at),
        } => now < at,
        _ => true,
    });
    state.explosions.retain(|fx| now < fx.expires_at);

    resolve_collisions(state, &mut events);

    // Losing pre-empts clearing
    if state.lives <= 0 {
        state.phase = LevelPhase::PlayerDead;
        log::info!("{}: player out of lives", state.level);
        events.push(GameEvent::PlayerDied);
    } else if state.enemies_remaining() == 0 {
        state.phase = LevelPhase::Cleared;
        services.progress.mark_complete(&state.level.name());
        log::info!("{} cleared at tick {}", state.level, state.time_ticks);
        events.push(GameEvent::LevelCleared(state.level));
    }

    events
}

/// Remove entities whose hit counter dropped below zero on an earlier step
fn destroy_doomed(state: &mut LevelState, services: &mut Services<'_>, events: &mut Vec<GameEvent>) {
    let expires_at = state.time_ticks + secs_to_ticks(state.tuning.explosion_duration);
    let mut destroyed = Vec::new();
    state.entities.retain(|entity| {
        if entity.is_doomed() {
            destroyed.push((entity.kind, entity.pos, entity.behavior.clone()));
            false
        } else {
            true
        }
    });

    for (kind, pos, behavior) in destroyed {
        state.explosions.push(Explosion { pos, expires_at });
        services.audio.explode_sound();
        events.push(GameEvent::Destroyed { kind, pos });

        if let Behavior::Oscillate { score_value, .. } = behavior {
            services.progress.add_score(score_value);
            log::debug!(
                "Enemy destroyed, +{} (total {})",
                score_value,
                services.progress.score()
            );
            events.push(GameEvent::ScoreAwarded {
                points: score_value,
            });
        }
    }
}

fn update_player(
    state: &mut LevelState,
    services: &mut Services<'_>,
    input: &TickInput,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let speed = state.tuning.player_speed;
    let fire_rate_ticks = secs_to_ticks(state.tuning.fire_rate);
    let now = state.time_ticks;
    let axis = input.horizontal.clamp(-1.0, 1.0);

    let mut muzzle = None;
    for entity in state.entities.iter_mut() {
        let Behavior::Pilot {
            next_fire_tick,
            facing,
        } = &mut entity.behavior
        else {
            continue;
        };

        let limit = PLAYFIELD_HALF_WIDTH - entity.half_extents.x;
        entity.pos.x = (entity.pos.x + axis * speed * dt).clamp(-limit, limit);
        if axis != 0.0 {
            *facing = axis.signum();
        }

        if input.fire && now >= *next_fire_tick {
            *next_fire_tick = now + fire_rate_ticks;
            muzzle = Some(entity.pos);
        }
    }

    if let Some(pos) = muzzle {
        fire_volley(state, EntityKind::PlayerAmmo, pos, PLAYER_GUN_OFFSET_Y);
        services.audio.laser_sound();
        events.push(GameEvent::Fired {
            shooter: EntityKind::Player,
        });
    }
}

fn update_enemies(
    state: &mut LevelState,
    services: &mut Services<'_>,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let tuning = &state.tuning;
    let (speed, down, distance, interval) = (
        tuning.enemy_speed,
        tuning.enemy_down_speed,
        tuning.enemy_move_distance,
        tuning.enemy_fire_interval,
    );

    let mut ready = Vec::new();
    for entity in state.entities.iter_mut() {
        let Behavior::Oscillate {
            start_x,
            direction,
            fire_timer,
            ..
        } = &mut entity.behavior
        else {
            continue;
        };

        entity.pos.y -= down * dt;
        entity.pos.x += *direction * speed * dt;
        if entity.pos.x >= *start_x + distance {
            *direction = -1.0;
        } else if entity.pos.x <= *start_x - distance {
            *direction = 1.0;
        }

        *fire_timer += dt;
        if *fire_timer >= interval {
            ready.push((entity.id, entity.pos));
        }
    }

    // Hold fire while another enemy sits in the line of fire; the timer
    // keeps running so the shot goes out as soon as the lane clears
    for (id, pos) in ready {
        let probe = pos + Vec2::NEG_Y * LOS_PROBE_OFFSET;
        if ray_blocked(
            &state.entities,
            probe,
            Vec2::NEG_Y,
            LOS_PROBE_LENGTH,
            EntityKind::Enemy,
            id,
        ) {
            continue;
        }

        if let Some(Behavior::Oscillate { fire_timer, .. }) =
            state.entity_mut(id).map(|e| &mut e.behavior)
        {
            *fire_timer = 0.0;
        }
        fire_volley(state, EntityKind::HostileAmmo, pos, ENEMY_GUN_OFFSET_Y);
        services.audio.laser_sound();
        events.push(GameEvent::Fired {
            shooter: EntityKind::Enemy,
        });
    }
}

/// Two shots, one from each gun
fn fire_volley(state: &mut LevelState, kind: EntityKind, origin: Vec2, offset_y: f32) {
    for side in [-1.0, 1.0] {
        let muzzle = origin + Vec2::new(side * GUN_OFFSET_X, offset_y);
        state.spawn_ammo(kind, muzzle);
    }
}

/// Apply the reaction table to every contact that started this step
///
/// Each contact counts once no matter how many steps the pair stays
/// overlapped. Several contacts on one entity in the same step each apply,
/// so a hit counter can drop by more than one at once.
fn resolve_collisions(state: &mut LevelState, events: &mut Vec<GameEvent>) {
    let current = overlapping_pairs(&state.entities);
    let fresh = new_contacts(&state.contacts, &current);
    state.contacts = current;
    if fresh.is_empty() {
        return;
    }

    let mut removed: Vec<u32> = Vec::new();
    for (a, b) in fresh {
        let (Some(ka), Some(kb)) = (
            state.entity(a).map(|e| e.kind),
            state.entity(b).map(|e| e.kind),
        ) else {
            continue;
        };

        for (subject, kind, other) in [(a, ka, kb), (b, kb, ka)] {
            match reaction(kind, other) {
                Reaction::Ignore => {}
                Reaction::Damage => {
                    if let Some(entity) = state.entity_mut(subject) {
                        entity.health -= 1;
                    }
                }
                Reaction::Despawn => removed.push(subject),
                Reaction::LoseLife => {
                    state.lives -= 1;
                    log::debug!("Player hit, {} lives left", state.lives);
                    events.push(GameEvent::LifeLost { lives: state.lives });
                }
                Reaction::Breach => {
                    if !removed.contains(&subject) {
                        state.lives -= 1;
                        removed.push(subject);
                        log::debug!("Enemy {} breached, {} lives left", subject, state.lives);
                        events.push(GameEvent::EnemyBreached { id: subject });
                        events.push(GameEvent::LifeLost { lives: state.lives });
                    }
                }
            }
        }
    }

    if !removed.is_empty() {
        state.entities.retain(|e| !removed.contains(&e.id));
        state
            .contacts
            .retain(|(a, b)| !removed.contains(a) && !removed.contains(b));
    }
}

/// Steer under the nearest enemy and press fire every step
fn autopilot_input(state: &LevelState) -> TickInput {
    let Some(player) = state.player() else {
        return TickInput::default();
    };
    let target = state
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::Enemy)
        .min_by(|a, b| {
            let da = (a.pos - player.pos).length_squared();
            let db = (b.pos - player.pos).length_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

    let horizontal = match target {
        Some(enemy) => {
            let dx = enemy.pos.x - player.pos.x;
            if dx.abs() < 0.1 { 0.0 } else { dx.signum() }
        }
        None => 0.0,
    };

    TickInput {
        horizontal,
        fire: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::LevelId;
    use crate::tuning::Tuning;

    struct Harness {
        state: LevelState,
        progress: Progress,
        audio: AudioManager,
    }

    impl Harness {
        /// Level with only the player and end zone, plus one idle enemy so it
        /// doesn't clear immediately
        fn new() -> Self {
            Self::with_tuning(Tuning::default())
        }

        fn with_tuning(tuning: Tuning) -> Self {
            let mut state = LevelState::empty(LevelId::FIRST, &tuning, 1);
            let keeper = state.spawn_enemy(Vec2::new(7.0, 5.0));
            if let Some(e) = state.entity_mut(keeper) {
                e.behavior = Behavior::Inert;
            }
            Self {
                state,
                progress: Progress::with_default_levels(),
                audio: AudioManager::new(),
            }
        }

        fn step(&mut self, input: &TickInput) -> Vec<GameEvent> {
            let mut services = Services {
                progress: &mut self.progress,
                audio: &mut self.audio,
            };
            tick(&mut self.state, &mut services, input, SIM_DT)
        }

        fn idle(&mut self) -> Vec<GameEvent> {
            self.step(&TickInput::default())
        }

        fn shot_at(&mut self, kind: EntityKind, pos: Vec2) -> u32 {
            let id = self.state.spawn_ammo(kind, pos);
            if let Some(shot) = self.state.entity_mut(id) {
                shot.vel = Vec2::ZERO;
            }
            id
        }
    }

    #[test]
    fn test_rock_with_two_hits_survives_two_and_dies_after_third() {
        let mut h = Harness::new();
        let rock = h.state.spawn_rock(Vec2::new(-3.0, 0.0), 2);

        for hit in 1..=3 {
            h.shot_at(EntityKind::PlayerAmmo, Vec2::new(-3.0, 0.0));
            h.idle();
            let health = h.state.entity(rock).map(|r| r.health);
            assert_eq!(health, Some(2 - hit), "after hit {hit}");
        }

        // Lethal hit landed; the rock is still there until the next check
        assert!(h.state.entity(rock).is_some());
        let events = h.idle();
        assert!(h.state.entity(rock).is_none());
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Destroyed {
                kind: EntityKind::Rock,
                ..
            }
        )));
        assert_eq!(h.state.explosions.len(), 1);
        assert_eq!(h.progress.score(), 0);
    }

    #[test]
    fn test_same_step_hits_over_decrement() {
        let mut h = Harness::new();
        let rock = h.state.spawn_rock(Vec2::new(-3.0, 0.0), 0);
        for dx in [-0.2, 0.0, 0.2] {
            h.shot_at(EntityKind::HostileAmmo, Vec2::new(-3.0 + dx, 0.0));
        }
        h.idle();
        assert_eq!(h.state.entity(rock).map(|r| r.health), Some(-3));
        assert_eq!(h.state.count(EntityKind::HostileAmmo), 0);
    }

    #[test]
    fn test_overlapping_rocks_stay_one_contact() {
        let mut h = Harness::new();
        let rock = h.state.spawn_rock(Vec2::new(-3.0, 0.0), 5);
        let other = h.state.spawn_rock(Vec2::new(-3.2, 0.0), 5);
        h.idle();
        h.idle();
        assert_eq!(h.state.entity(rock).map(|r| r.health), Some(5));
        assert_eq!(h.state.entity(other).map(|r| r.health), Some(5));
        let pair = (rock.min(other), rock.max(other));
        assert_eq!(h.state.contacts.iter().filter(|c| **c == pair).count(), 1);
    }

    #[test]
    fn test_enemy_kill_credits_score_next_step() {
        let mut h = Harness::new();
        let enemy = h.state.spawn_enemy(Vec2::new(-4.0, 2.0));
        if let Some(e) = h.state.entity_mut(enemy) {
            e.behavior = Behavior::Oscillate {
                start_x: -4.0,
                direction: 1.0,
                fire_timer: f32::MIN,
                score_value: 150,
            };
        }
        h.shot_at(EntityKind::PlayerAmmo, Vec2::new(-4.0, 2.0));
        h.idle();
        assert_eq!(h.progress.score(), 0);
        assert_eq!(h.state.entity(enemy).map(|e| e.health), Some(-1));

        let events = h.idle();
        assert_eq!(h.progress.score(), 150);
        assert!(events.contains(&GameEvent::ScoreAwarded { points: 150 }));
        assert!(h.state.entity(enemy).is_none());
        let sounds = h.audio.drain();
        assert!(sounds.iter().any(|p| p.effect == crate::SoundEffect::Explosion));
    }

    #[test]
    fn test_enemy_oscillates_and_drifts_down() {
        let tuning = Tuning {
            enemy_fire_interval: 1000.0,
            ..Tuning::default()
        };
        let mut h = Harness::with_tuning(tuning.clone());
        let enemy = h.state.spawn_enemy(Vec2::new(0.0, 3.0));

        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        for _ in 0..(5.0 / SIM_DT) as usize {
            h.idle();
            let pos = h.state.entity(enemy).unwrap().pos;
            min_x = min_x.min(pos.x);
            max_x = max_x.max(pos.x);
        }
        let margin = tuning.enemy_speed * SIM_DT * 2.0;
        assert!(max_x >= tuning.enemy_move_distance - margin);
        assert!(max_x <= tuning.enemy_move_distance + margin);
        assert!(min_x <= -tuning.enemy_move_distance + margin);
        let y = h.state.entity(enemy).unwrap().pos.y;
        assert!((y - (3.0 - 5.0 * tuning.enemy_down_speed)).abs() < 0.05);
    }

    #[test]
    fn test_enemy_fires_pair_after_interval() {
        let tuning = Tuning {
            enemy_fire_interval: 0.5,
            enemy_down_speed: 0.0,
            ..Tuning::default()
        };
        let mut h = Harness::with_tuning(tuning);
        h.state.spawn_enemy(Vec2::new(-4.0, 3.0));

        let mut fired = 0;
        for _ in 0..secs_to_ticks(0.5) + 1 {
            fired += h
                .idle()
                .iter()
                .filter(|e| matches!(e, GameEvent::Fired { shooter: EntityKind::Enemy }))
                .count();
        }
        assert_eq!(fired, 1);
        assert_eq!(h.state.count(EntityKind::HostileAmmo), 2);
    }

    #[test]
    fn test_enemy_holds_fire_behind_ally() {
        let tuning = Tuning {
            enemy_fire_interval: 0.1,
            enemy_down_speed: 0.0,
            enemy_speed: 0.0,
            ..Tuning::default()
        };
        let mut h = Harness::with_tuning(tuning);
        let top = h.state.spawn_enemy(Vec2::new(-4.0, 4.0));
        let bottom = h.state.spawn_enemy(Vec2::new(-4.0, 2.0));
        if let Some(e) = h.state.entity_mut(bottom) {
            e.behavior = Behavior::Inert;
        }

        for _ in 0..secs_to_ticks(0.5) {
            h.idle();
        }
        assert_eq!(h.state.count(EntityKind::HostileAmmo), 0);
        match &h.state.entity(top).unwrap().behavior {
            Behavior::Oscillate { fire_timer, .. } => assert!(*fire_timer >= 0.1),
            other => panic!("unexpected behavior {other:?}"),
        }
    }

    #[test]
    fn test_player_fire_rate_gate() {
        let mut h = Harness::new();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        let mut volleys = 0;
        for _ in 0..secs_to_ticks(1.0) {
            volleys += h
                .step(&fire)
                .iter()
                .filter(|e| matches!(e, GameEvent::Fired { shooter: EntityKind::Player }))
                .count();
        }
        // t = 0.0 (first tick) and t = 0.5
        assert_eq!(volleys, 2);
        assert_eq!(h.state.count(EntityKind::PlayerAmmo), 4);
        assert_eq!(h.audio.drain().len(), 2);
    }

    #[test]
    fn test_player_moves_within_playfield() {
        let mut h = Harness::new();
        let right = TickInput {
            horizontal: 1.0,
            ..Default::default()
        };
        for _ in 0..secs_to_ticks(10.0) {
            h.step(&right);
        }
        let player = h.state.player().unwrap();
        assert!((player.pos.x - (PLAYFIELD_HALF_WIDTH - PLAYER_HALF_SIZE)).abs() < 1e-4);
        assert_eq!(
            player.behavior,
            Behavior::Pilot {
                next_fire_tick: 0,
                facing: 1.0
            }
        );
    }

    #[test]
    fn test_friendly_shot_expires() {
        let mut h = Harness::new();
        let shot = h.state.spawn_ammo(EntityKind::PlayerAmmo, Vec2::new(-6.0, -2.0));
        for _ in 0..secs_to_ticks(5.0) - 1 {
            h.idle();
        }
        assert!(h.state.entity(shot).is_some());
        h.idle();
        assert!(h.state.entity(shot).is_none());
    }

    #[test]
    fn test_hostile_shot_hits_player() {
        let mut h = Harness::new();
        let lives = h.state.lives;
        h.shot_at(EntityKind::HostileAmmo, Vec2::new(0.0, PLAYER_ROW_Y));
        let events = h.idle();
        assert_eq!(h.state.lives, lives - 1);
        assert!(events.contains(&GameEvent::LifeLost { lives: lives - 1 }));
        assert_eq!(h.state.count(EntityKind::HostileAmmo), 0);
    }

    #[test]
    fn test_breach_costs_life_without_score() {
        let mut h = Harness::new();
        let enemy = h.state.spawn_enemy(Vec2::new(-5.0, END_ZONE_Y));
        let events = h.idle();
        assert!(h.state.entity(enemy).is_none());
        assert!(events.contains(&GameEvent::EnemyBreached { id: enemy }));
        assert_eq!(h.state.lives, Tuning::default().starting_lives - 1);
        assert_eq!(h.progress.score(), 0);
        assert!(h.state.explosions.is_empty());
    }

    #[test]
    fn test_death_preempts_clear() {
        let mut h = Harness::new();
        h.state.entities.retain(|e| e.kind != EntityKind::Enemy);
        h.state.lives = 1;
        h.shot_at(EntityKind::HostileAmmo, Vec2::new(0.0, PLAYER_ROW_Y));

        let events = h.idle();
        assert_eq!(h.state.phase, LevelPhase::PlayerDead);
        assert!(events.contains(&GameEvent::PlayerDied));
        assert_eq!(h.progress.is_complete("level1"), Some(false));

        // Nothing moves once the level is over
        assert!(h.idle().is_empty());
    }

    #[test]
    fn test_clearing_marks_level_complete() {
        let mut h = Harness::new();
        h.state.entities.retain(|e| e.kind != EntityKind::Enemy);
        let events = h.idle();
        assert_eq!(h.state.phase, LevelPhase::Cleared);
        assert!(events.contains(&GameEvent::LevelCleared(LevelId::FIRST)));
        assert_eq!(h.progress.is_complete("level1"), Some(true));
    }

    #[test]
    fn test_autopilot_level_always_ends() {
        let mut state = LevelState::new(LevelId::FIRST, &Tuning::default(), 5);
        let mut progress = Progress::with_default_levels();
        let mut audio = AudioManager::new();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..secs_to_ticks(120.0) {
            let mut services = Services {
                progress: &mut progress,
                audio: &mut audio,
            };
            tick(&mut state, &mut services, &input, SIM_DT);
            if state.phase != LevelPhase::Playing {
                break;
            }
        }
        assert_ne!(state.phase, LevelPhase::Playing);
    }
}
