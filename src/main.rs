//! Star Defender entry point
//!
//! Runs a headless session on autopilot: resumes from the save (or starts a
//! new game), plays at 60 frames per second of simulated time until the run
//! ends, then saves and prints the final HUD.
//!
//! Usage: `star-defender [SAVE_DIR]`

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use star_defender::persistence::SaveStore;
use star_defender::session::SessionConfig;
use star_defender::sim::{GameEvent, TickInput};
use star_defender::{LoadOutcome, Scene, Session, Settings, Tuning};

/// Simulated frame length
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after this many frames (10 minutes of play)
const MAX_FRAMES: u32 = 60 * 60 * 10;

fn main() {
    env_logger::init();
    log::info!("Star Defender (headless) starting...");

    let save_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(SaveStore::default_dir)
        .unwrap_or_else(|| PathBuf::from(".star-defender"));

    let settings = match Settings::default_path() {
        Some(path) if path.exists() => Settings::load_from(&path),
        Some(path) => {
            // First run: leave an editable settings file behind
            let settings = Settings::default();
            if let Err(e) = settings.save_to(&path) {
                log::warn!("Could not write default settings: {e}");
            }
            settings
        }
        None => Settings::default(),
    };
    let tuning = Tuning::default_path()
        .map(|path| Tuning::load_from(&path))
        .unwrap_or_default();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut session = Session::new(SessionConfig {
        save_dir,
        settings,
        tuning,
        seed,
    });

    match session.load_game() {
        Ok(LoadOutcome::Resumed(stage)) => log::info!("Resumed at {:?}", stage),
        Ok(LoadOutcome::NoSave) => {
            session.start_game();
        }
        Ok(LoadOutcome::Discarded(reason)) => {
            log::warn!("Starting fresh, old save discarded: {reason}");
            session.start_game();
        }
        Err(e) => {
            log::error!("Could not load save ({e}), starting fresh");
            session.start_game();
        }
    }

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut sounds = 0usize;
    for frame in 0..MAX_FRAMES {
        if !matches!(session.scene(), Scene::Level(_)) {
            break;
        }

        for event in session.frame(FRAME_DT, &input) {
            match event {
                GameEvent::LevelCleared(level) => println!("{level} cleared"),
                GameEvent::PlayerDied => println!("Out of lives"),
                GameEvent::EnemyBreached { .. } => log::info!("An enemy got through"),
                _ => {}
            }
        }
        sounds += session.audio_mut().drain().len();
        if let Some(notice) = session.take_notice() {
            println!("Notice: {notice}");
        }

        if frame % 600 == 0 {
            let hud = session.hud();
            log::info!(
                "[{}] score {} lives {}",
                hud.scene,
                hud.score,
                hud.lives.as_deref().unwrap_or("-")
            );
        }
    }

    if let Err(e) = session.save_game() {
        log::error!("Final save failed: {e}");
    }

    let hud = session.hud();
    println!("Final scene: {}", hud.scene);
    println!("Score: {}", hud.score);
    println!("Sound effects played: {sounds}");
    if let Some(notice) = session.take_notice() {
        println!("Notice: {notice}");
    }
}
