//! Data-driven game balance
//!
//! Every gameplay number the simulation reads lives here so it can be
//! overridden from a JSON file without rebuilding.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Gameplay tuning values (speeds in world units per second)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_speed: f32,
    /// Minimum seconds between volleys
    pub fire_rate: f32,
    pub starting_lives: i32,

    // === Enemies ===
    /// Horizontal oscillation speed
    pub enemy_speed: f32,
    /// Constant downward drift
    pub enemy_down_speed: f32,
    /// Oscillation amplitude around the spawn column
    pub enemy_move_distance: f32,
    /// Seconds between volleys
    pub enemy_fire_interval: f32,
    pub enemy_score: u64,
    /// Remaining hits before destruction (destroyed once it drops below zero)
    pub enemy_health: i32,

    // === Rocks ===
    pub rock_health: i32,

    // === Ammo ===
    pub player_ammo_speed: f32,
    pub hostile_ammo_speed: f32,
    /// Seconds before a friendly shot self-destructs
    pub player_ammo_lifetime: f32,

    // === Effects ===
    pub explosion_duration: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 6.0,
            fire_rate: 0.5,
            starting_lives: 3,

            enemy_speed: 2.0,
            enemy_down_speed: 1.0,
            enemy_move_distance: 3.0,
            enemy_fire_interval: 5.0,
            enemy_score: 100,
            enemy_health: 0,

            rock_health: 2,

            player_ammo_speed: 2.0,
            hostile_ammo_speed: 2.0,
            player_ammo_lifetime: 5.0,

            explosion_duration: 1.0,
        }
    }
}

impl Tuning {
    const FILE_NAME: &'static str = "tuning.json";

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("star-defender").join(Self::FILE_NAME))
    }

    /// Load overrides from JSON; unspecified fields keep their defaults
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            log::debug!("No tuning overrides at {:?}", path);
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides from {:?}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring malformed tuning file {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
