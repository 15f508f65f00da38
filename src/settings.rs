//! Game settings and preferences
//!
//! Persisted separately from game saves, as JSON in the user's config
//! directory. Missing or unreadable files fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::persistence::PersistError;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence all effects
    pub muted: bool,

    // === Saves ===
    /// Save progress whenever a level is cleared
    pub autosave: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            autosave: true,
        }
    }
}

impl Settings {
    const FILE_NAME: &'static str = "settings.json";

    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("star-defender").join(Self::FILE_NAME))
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No settings at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| PersistError::io(parent, "create directory", e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PersistError::io(path, "encode", e.into()))?;
        fs::write(path, json).map_err(|e| PersistError::io(path, "write", e))?;
        log::info!("Settings saved");
        Ok(())
    }
}
