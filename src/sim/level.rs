//! Level layouts
//!
//! Each level is an enemy formation plus a scattering of rocks between the
//! formation and the player. Rock placement is jittered from the level seed,
//! so the same seed always builds the same level.

use glam::Vec2;
use rand::Rng;

use super::state::LevelState;
use crate::consts::*;
use crate::scene::LevelId;

/// Shape of one level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelLayout {
    pub enemy_rows: u32,
    pub enemies_per_row: u32,
    pub rocks: u32,
    /// Added to the tuned rock health
    pub extra_rock_health: i32,
}

impl LevelLayout {
    pub fn for_level(level: LevelId) -> Self {
        match level.number() {
            1 => Self {
                enemy_rows: 1,
                enemies_per_row: 3,
                rocks: 2,
                extra_rock_health: 0,
            },
            2 => Self {
                enemy_rows: 1,
                enemies_per_row: 4,
                rocks: 3,
                extra_rock_health: 0,
            },
            3 => Self {
                enemy_rows: 2,
                enemies_per_row: 4,
                rocks: 4,
                extra_rock_health: 1,
            },
            _ => Self {
                enemy_rows: 2,
                enemies_per_row: 5,
                rocks: 5,
                extra_rock_health: 2,
            },
        }
    }

    pub fn enemy_count(&self) -> u32 {
        self.enemy_rows * self.enemies_per_row
    }
}

/// Horizontal spacing between formation columns
const COLUMN_SPACING: f32 = 2.5;
/// Vertical spacing between formation rows
const ROW_SPACING: f32 = 1.5;
/// Rocks sit in this band between the formation and the player
const ROCK_BAND: (f32, f32) = (-1.5, 1.5);

/// Spawn the layout's enemies and rocks into `state`
pub fn populate(state: &mut LevelState) {
    let layout = LevelLayout::for_level(state.level);

    // Stagger odd rows by half a column so rows don't stack in one line of fire
    for row in 0..layout.enemy_rows {
        let y = FORMATION_TOP_Y - row as f32 * ROW_SPACING;
        let stagger = if row % 2 == 1 { COLUMN_SPACING / 2.0 } else { 0.0 };
        let width = (layout.enemies_per_row - 1) as f32 * COLUMN_SPACING;
        for col in 0..layout.enemies_per_row {
            let x = -width / 2.0 + col as f32 * COLUMN_SPACING + stagger;
            state.spawn_enemy(Vec2::new(x, y));
        }
    }

    // Seed mixes in the level number so levels differ within a run
    state.rng_state.stream = state.level.number() as u64;
    let mut rng = state.rng_state.to_rng();
    let rock_health = state.tuning.rock_health + layout.extra_rock_health;
    let lane = 2.0 * (PLAYFIELD_HALF_WIDTH - 1.0) / layout.rocks.max(1) as f32;
    for i in 0..layout.rocks {
        let lane_start = -(PLAYFIELD_HALF_WIDTH - 1.0) + i as f32 * lane;
        let x = lane_start + rng.random_range(0.2..(lane - 0.2).max(0.3));
        let y = rng.random_range(ROCK_BAND.0..ROCK_BAND.1);
        state.spawn_rock(Vec2::new(x, y), rock_health);
    }

    state.normalize_order();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EntityKind;
    use crate::tuning::Tuning;

    #[test]
    fn test_layouts_grow_harder() {
        let counts: Vec<u32> = LevelId::all()
            .map(|level| LevelLayout::for_level(level).enemy_count())
            .collect();
        assert_eq!(counts, vec![3, 4, 8, 10]);
    }

    #[test]
    fn test_populate_matches_layout() {
        for level in LevelId::all() {
            let state = LevelState::new(level, &Tuning::default(), 7);
            let layout = LevelLayout::for_level(level);
            assert_eq!(state.count(EntityKind::Enemy) as u32, layout.enemy_count());
            assert_eq!(state.count(EntityKind::Rock) as u32, layout.rocks);
        }
    }

    #[test]
    fn test_same_seed_same_rocks() {
        let level = LevelId::new(3).unwrap();
        let rocks = |seed| {
            LevelState::new(level, &Tuning::default(), seed)
                .entities
                .iter()
                .filter(|e| e.kind == EntityKind::Rock)
                .map(|e| e.pos)
                .collect::<Vec<_>>()
        };
        assert_eq!(rocks(42), rocks(42));
        assert_ne!(rocks(42), rocks(43));
    }

    #[test]
    fn test_rocks_stay_in_playfield() {
        let state = LevelState::new(LevelId::new(4).unwrap(), &Tuning::default(), 99);
        for rock in state.entities.iter().filter(|e| e.kind == EntityKind::Rock) {
            assert!(rock.pos.x.abs() <= PLAYFIELD_HALF_WIDTH);
            assert!(rock.pos.y >= ROCK_BAND.0 && rock.pos.y < ROCK_BAND.1);
        }
    }
}
