//! Pause overlay
//!
//! Freezes simulation time while open and offers save/load/quit actions,
//! which the session carries out.

use crate::scene::Scene;

/// Buttons on the pause overlay (and the end screens)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseAction {
    Resume,
    Save,
    Load,
    MainMenu,
    Quit,
    /// Restart from the first level
    TryAgain,
}

#[derive(Debug, Clone, Default)]
pub struct PauseMenu {
    paused: bool,
}

impl PauseMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Escape handler; end screens have no pause overlay
    pub fn toggle(&mut self, scene: Scene) -> bool {
        if scene.is_end_screen() {
            return false;
        }
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
        log::debug!("Paused");
    }

    pub fn resume(&mut self) {
        self.paused = false;
        log::debug!("Resumed");
    }

    /// Simulation time multiplier
    pub fn time_scale(&self) -> f32 {
        if self.paused { 0.0 } else { 1.0 }
    }
}
