//! Star Defender - a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, level rules)
//! - `progress`: Score and level completion, resume scan
//! - `persistence`: Versioned, checksummed saves with atomic replace
//! - `session`: Application context owning the fixed-step loop and scenes
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod pause;
pub mod persistence;
pub mod progress;
pub mod scene;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use audio::{AudioManager, SoundEffect};
pub use progress::{Progress, Stage};
pub use scene::{LevelId, Scene, SceneRequest};
pub use session::{LoadOutcome, Session};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Number of playable levels
    pub const LEVEL_COUNT: u8 = 4;

    /// Playfield dimensions (world units, origin at screen center)
    pub const PLAYFIELD_HALF_WIDTH: f32 = 8.0;
    pub const PLAYER_ROW_Y: f32 = -4.0;
    pub const END_ZONE_Y: f32 = -6.0;
    pub const FORMATION_TOP_Y: f32 = 4.0;

    /// Entity half extents for overlap tests
    pub const PLAYER_HALF_SIZE: f32 = 0.5;
    pub const ENEMY_HALF_SIZE: f32 = 0.4;
    pub const ROCK_HALF_SIZE: f32 = 0.5;
    pub const AMMO_HALF_WIDTH: f32 = 0.05;
    pub const AMMO_HALF_HEIGHT: f32 = 0.15;
    pub const END_ZONE_HALF_HEIGHT: f32 = 0.25;

    /// Gun muzzle offsets from the shooter's center
    pub const GUN_OFFSET_X: f32 = 0.3;
    pub const PLAYER_GUN_OFFSET_Y: f32 = 0.7;
    pub const ENEMY_GUN_OFFSET_Y: f32 = -0.6;

    /// Line-of-sight probe for enemy fire suppression
    pub const LOS_PROBE_OFFSET: f32 = 0.5;
    pub const LOS_PROBE_LENGTH: f32 = 100.0;
}

/// Convert a duration in seconds to whole simulation ticks (rounded)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    (secs.max(0.0) / consts::SIM_DT).round() as u64
}
