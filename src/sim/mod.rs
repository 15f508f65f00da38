//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod kind;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{overlapping_pairs, overlaps, ray_blocked, ray_hit};
pub use kind::{EntityKind, Reaction, reaction};
pub use level::LevelLayout;
pub use state::{Behavior, Entity, Explosion, GameEvent, LevelPhase, LevelState};
pub use tick::{Services, TickInput, tick};
