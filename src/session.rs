//! Game session
//!
//! The session is the application context: it is created at startup, owns
//! progress, audio, the save slot and the running level, and is passed by
//! reference to whatever drives frames. Scene changes, pause handling and
//! save/load all go through it.

use std::path::PathBuf;

use crate::audio::AudioManager;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::pause::{PauseAction, PauseMenu};
use crate::persistence::{CorruptReason, PersistError, SaveSource, SaveStore};
use crate::progress::{Progress, Stage};
use crate::scene::{LevelId, Scene, SceneRequest};
use crate::settings::Settings;
use crate::sim::{GameEvent, LevelPhase, LevelState, Services, TickInput, tick};
use crate::tuning::Tuning;

/// Everything needed to open a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub save_dir: PathBuf,
    pub settings: Settings,
    pub tuning: Tuning,
    /// Level generation seed
    pub seed: u64,
}

/// Result of a load request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Save applied; play continues at this stage
    Resumed(Stage),
    /// Nothing saved yet, state untouched
    NoSave,
    /// Save was unusable and has been moved aside, state untouched
    Discarded(CorruptReason),
}

/// Text shown by the HUD and end screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub scene: Scene,
    pub score: String,
    /// Only while a level is running
    pub lives: Option<String>,
    pub paused: bool,
    /// Latest message for the player (save problems etc.)
    pub notice: Option<String>,
}

pub struct Session {
    progress: Progress,
    store: SaveStore,
    audio: AudioManager,
    settings: Settings,
    tuning: Tuning,
    pause: PauseMenu,
    scene: Scene,
    level: Option<LevelState>,
    accumulator: f32,
    seed: u64,
    quit_requested: bool,
    notice: Option<String>,
    /// Fire button state on the previous frame
    fire_was_down: bool,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        log::info!("Session started (seed {})", config.seed);
        Self {
            progress: Progress::with_default_levels(),
            store: SaveStore::new(config.save_dir),
            audio: AudioManager::from_settings(&config.settings),
            settings: config.settings,
            tuning: config.tuning,
            pause: PauseMenu::new(),
            scene: Scene::MainMenu,
            level: None,
            accumulator: 0.0,
            seed: config.seed,
            quit_requested: false,
            notice: None,
            fire_was_down: false,
        }
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn level(&self) -> Option<&LevelState> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut LevelState> {
        self.level.as_mut()
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Switch to a scene by index or name; unknown requests are ignored
    pub fn request_scene(&mut self, request: SceneRequest) -> Option<Scene> {
        match request.resolve() {
            Some(scene) => {
                self.enter_scene(scene);
                Some(scene)
            }
            None => {
                log::warn!("Ignoring request for unknown scene {:?}", request);
                None
            }
        }
    }

    fn enter_scene(&mut self, scene: Scene) {
        log::info!("Loading scene {} (from {})", scene, self.scene);
        self.scene = scene;
        self.pause.resume();
        self.accumulator = 0.0;
        self.level = match scene {
            Scene::Level(level) => Some(LevelState::new(level, &self.tuning, self.seed)),
            _ => None,
        };
    }

    /// Move to the scene after the current one in build order
    pub fn start_game(&mut self) -> Option<Scene> {
        let next = self.scene.build_index() + 1;
        self.request_scene(SceneRequest::Index(next))
    }

    /// Restart from the first level, keeping score and completion flags
    pub fn try_again(&mut self) -> Option<Scene> {
        self.request_scene(SceneRequest::Index(LevelId::FIRST.number() as usize))
    }

    pub fn load_main_menu(&mut self) {
        self.enter_scene(Scene::MainMenu);
    }

    pub fn quit(&mut self) {
        log::info!("Quitting game...");
        self.quit_requested = true;
    }

    pub fn save_game(&mut self) -> Result<(), PersistError> {
        let record = self.progress.to_record();
        self.store.save(&record).inspect_err(|e| {
            log::error!("Save failed: {e}");
            self.notice = Some(format!("Could not save: {e}"));
        })
    }

    /// Restore progress from the save slot and jump to the resume stage
    pub fn load_game(&mut self) -> Result<LoadOutcome, PersistError> {
        match self.store.load() {
            Ok((record, source)) => {
                if let SaveSource::Recovered(reason) = &source {
                    self.notice = Some(format!(
                        "Latest save was damaged ({reason}); restored the previous one"
                    ));
                }
                self.progress.apply_record(&record);
                let stage = self.progress.resume_target();
                match stage {
                    Stage::Level(level) => log::info!("Loading first uncompleted level: {level}"),
                    _ => log::info!("All levels completed!"),
                }
                self.enter_scene(stage.scene());
                Ok(LoadOutcome::Resumed(stage))
            }
            Err(PersistError::NotFound { path }) => {
                log::info!("No save at {:?}, nothing to load", path);
                Ok(LoadOutcome::NoSave)
            }
            Err(PersistError::Corrupt { path, reason }) => {
                log::warn!("Discarding corrupt save {:?}: {}", path, reason);
                self.store.quarantine()?;
                self.notice = Some(format!("Save file was damaged and has been reset ({reason})"));
                Ok(LoadOutcome::Discarded(reason))
            }
            Err(e) => {
                log::error!("Load failed: {e}");
                self.notice = Some(format!("Could not load save: {e}"));
                Err(e)
            }
        }
    }

    /// Carry out a pause overlay button
    pub fn pause_action(&mut self, action: PauseAction) -> Result<(), PersistError> {
        match action {
            PauseAction::Resume => self.pause.resume(),
            PauseAction::Save => self.save_game()?,
            PauseAction::Load => {
                self.load_game()?;
            }
            PauseAction::MainMenu => self.load_main_menu(),
            PauseAction::Quit => self.quit(),
            PauseAction::TryAgain => {
                self.try_again();
            }
        }
        Ok(())
    }

    /// Advance by one rendered frame of `dt` seconds
    ///
    /// `input.fire` is the held state of the fire button; a volley goes out
    /// only on the frame it goes down.
    pub fn frame(&mut self, dt: f32, input: &TickInput) -> Vec<GameEvent> {
        if input.pause {
            self.pause.toggle(self.scene);
        }
        let fire_pressed = input.fire && !self.fire_was_down;
        self.fire_was_down = input.fire;

        let mut events = Vec::new();
        let Some(level) = self.level.as_mut() else {
            return events;
        };

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT) * self.pause.time_scale();
        let mut step_input = TickInput {
            fire: fire_pressed,
            pause: false,
            ..input.clone()
        };

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let mut services = Services {
                progress: &mut self.progress,
                audio: &mut self.audio,
            };
            events.extend(tick(level, &mut services, &step_input, SIM_DT));
            step_input.fire = false;
            self.accumulator -= SIM_DT;
            substeps += 1;
            if level.phase != LevelPhase::Playing {
                break;
            }
        }

        let (phase, current) = (level.phase, level.level);
        match phase {
            LevelPhase::Playing => {}
            LevelPhase::Cleared => self.finish_level(current),
            LevelPhase::PlayerDead => self.enter_scene(Stage::PlayerDead.scene()),
        }
        events
    }

    fn finish_level(&mut self, level: LevelId) {
        if self.settings.autosave && self.save_game().is_err() {
            log::warn!("Autosave after {level} failed, continuing");
        }
        self.enter_scene(Stage::Level(level).advance().scene());
    }

    /// Current HUD text
    pub fn hud(&self) -> Hud {
        Hud {
            scene: self.scene,
            score: self.progress.score().to_string(),
            lives: self.level.as_ref().map(|level| level.lives.to_string()),
            paused: self.pause.is_paused(),
            notice: self.notice.clone(),
        }
    }

    /// Take the pending notice, if any
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
