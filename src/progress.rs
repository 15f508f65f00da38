//! Score and level completion
//!
//! `Progress` is created once per session and handed to whoever needs it;
//! the simulation credits score and marks levels complete through it, and
//! the persistence layer snapshots it wholesale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::SaveRecord;
use crate::scene::{LevelId, Scene};

/// Where the player is in the level progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Playing a level
    Level(LevelId),
    /// Every level cleared (terminal)
    AllComplete,
    /// Out of lives
    PlayerDead,
}

impl Stage {
    /// Stage entered after the current level is cleared
    pub fn advance(self) -> Stage {
        match self {
            Stage::Level(level) => level.next().map_or(Stage::AllComplete, Stage::Level),
            terminal => terminal,
        }
    }

    pub fn scene(self) -> Scene {
        match self {
            Stage::Level(level) => Scene::Level(level),
            Stage::AllComplete => Scene::WinScreen,
            Stage::PlayerDead => Scene::LoseScreen,
        }
    }
}

/// Session-wide score and level completion mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    score: u64,
    levels: BTreeMap<String, bool>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress with `level1`..`level4` registered as incomplete
    pub fn with_default_levels() -> Self {
        let mut progress = Self::new();
        progress.register_default_levels();
        progress
    }

    pub fn register_default_levels(&mut self) {
        for level in LevelId::all() {
            self.register_level(&level.name());
        }
    }

    /// Register a level as incomplete (no-op if already known)
    pub fn register_level(&mut self, id: &str) {
        self.levels.entry(id.to_string()).or_insert(false);
    }

    /// Mark a registered level complete. Unknown ids are ignored.
    pub fn mark_complete(&mut self, id: &str) -> bool {
        match self.levels.get_mut(id) {
            Some(done) => {
                *done = true;
                true
            }
            None => {
                log::debug!("Ignoring completion of unregistered level {id:?}");
                false
            }
        }
    }

    pub fn add_score(&mut self, delta: u64) {
        self.score = self.score.saturating_add(delta);
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Completion flag for a level, `None` if unregistered
    pub fn is_complete(&self, id: &str) -> Option<bool> {
        self.levels.get(id).copied()
    }

    /// All known levels with their completion flags, in id order
    pub fn levels(&self) -> impl Iterator<Item = (&str, bool)> {
        self.levels.iter().map(|(name, done)| (name.as_str(), *done))
    }

    /// Snapshot as positionally aligned name/flag sequences
    pub fn to_record(&self) -> SaveRecord {
        let (level_names, level_completed) = self
            .levels
            .iter()
            .map(|(name, done)| (name.clone(), *done))
            .unzip();
        SaveRecord {
            score: self.score,
            level_names,
            level_completed,
        }
    }

    /// Replace score and the whole completion mapping from a record
    ///
    /// Names the fixed level scan never looks at are kept as-is.
    pub fn apply_record(&mut self, record: &SaveRecord) {
        self.score = record.score;
        self.levels = record
            .level_names
            .iter()
            .cloned()
            .zip(record.level_completed.iter().copied())
            .collect();
    }

    /// First level in `level1`..`level4` order that is not complete
    ///
    /// A level missing from the mapping counts as not complete, so an
    /// empty mapping resumes at the first level.
    pub fn resume_target(&self) -> Stage {
        LevelId::all()
            .find(|level| self.is_complete(&level.name()) != Some(true))
            .map_or(Stage::AllComplete, Stage::Level)
    }
}
