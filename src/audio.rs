//! Audio triggers
//!
//! Gameplay code fires sounds and forgets about them. The manager applies
//! volume and mute, then queues playbacks for whatever output the host
//! wires up; the host drains the queue once per frame.

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Enemy or rock destroyed
    Explosion,
    /// Any ship firing
    Laser,
}

/// A queued sound with its final gain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    pub effect: SoundEffect,
    pub gain: f32,
}

/// Audio manager for the game
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    pending: Vec<Playback>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            pending: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut audio = Self::new();
        audio.apply_settings(settings);
        audio
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.muted = settings.muted;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Set sound effects volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Trigger a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let gain = self.gain();
        if gain <= 0.0 {
            return;
        }
        log::trace!("play {:?} at gain {:.2}", effect, gain);
        self.pending.push(Playback { effect, gain });
    }

    pub fn explode_sound(&mut self) {
        self.play(SoundEffect::Explosion);
    }

    pub fn laser_sound(&mut self) {
        self.play(SoundEffect::Laser);
    }

    /// Take every playback triggered since the last drain
    pub fn drain(&mut self) -> Vec<Playback> {
        std::mem::take(&mut self.pending)
    }
}
