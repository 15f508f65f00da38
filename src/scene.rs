//! Scene identifiers and transition requests
//!
//! Scenes are addressed either by build ordinal or by name, mirroring how
//! the menus and levels are laid out: main menu first, the four levels in
//! order, then the two end screens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_COUNT;

/// A playable level (1-based, `level1`..`level4`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelId(u8);

impl LevelId {
    pub const FIRST: LevelId = LevelId(1);

    /// Create a level id, rejecting numbers outside 1..=LEVEL_COUNT
    pub fn new(number: u8) -> Option<Self> {
        (1..=LEVEL_COUNT).contains(&number).then_some(Self(number))
    }

    /// All levels in play order
    pub fn all() -> impl Iterator<Item = LevelId> {
        (1..=LEVEL_COUNT).map(LevelId)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Identifier used in the completion mapping and scene names
    pub fn name(self) -> String {
        format!("level{}", self.0)
    }

    /// Parse `level<N>`
    pub fn parse(name: &str) -> Option<Self> {
        name.strip_prefix("level")
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Self::new)
    }

    /// The level that follows this one, if any
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level{}", self.0)
    }
}

/// A loadable scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scene {
    MainMenu,
    Level(LevelId),
    WinScreen,
    LoseScreen,
}

impl Scene {
    const WIN_INDEX: usize = LEVEL_COUNT as usize + 1;
    const LOSE_INDEX: usize = LEVEL_COUNT as usize + 2;

    pub fn name(&self) -> String {
        match self {
            Scene::MainMenu => "MainMenu".to_string(),
            Scene::Level(level) => level.name(),
            Scene::WinScreen => "WinScreen".to_string(),
            Scene::LoseScreen => "LoseScreen".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MainMenu" => Some(Scene::MainMenu),
            "WinScreen" => Some(Scene::WinScreen),
            "LoseScreen" => Some(Scene::LoseScreen),
            other => LevelId::parse(other).map(Scene::Level),
        }
    }

    /// Build ordinal (main menu = 0, levels 1..=4, then win and lose screens)
    pub fn build_index(&self) -> usize {
        match self {
            Scene::MainMenu => 0,
            Scene::Level(level) => level.number() as usize,
            Scene::WinScreen => Self::WIN_INDEX,
            Scene::LoseScreen => Self::LOSE_INDEX,
        }
    }

    pub fn from_build_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Scene::MainMenu),
            Self::WIN_INDEX => Some(Scene::WinScreen),
            Self::LOSE_INDEX => Some(Scene::LoseScreen),
            n => u8::try_from(n).ok().and_then(LevelId::new).map(Scene::Level),
        }
    }

    /// End screens show the final score and do not accept pause input
    pub fn is_end_screen(&self) -> bool {
        matches!(self, Scene::WinScreen | Scene::LoseScreen)
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A request to switch scenes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneRequest {
    Index(usize),
    Name(String),
}

impl SceneRequest {
    pub fn resolve(&self) -> Option<Scene> {
        match self {
            SceneRequest::Index(index) => Scene::from_build_index(*index),
            SceneRequest::Name(name) => Scene::from_name(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_id_bounds() {
        assert!(LevelId::new(0).is_none());
        assert!(LevelId::new(5).is_none());
        assert_eq!(LevelId::new(4).map(|l| l.name()), Some("level4".to_string()));
        assert_eq!(LevelId::new(4).and_then(LevelId::next), None);
        assert_eq!(LevelId::FIRST.next(), LevelId::new(2));
    }

    #[test]
    fn test_level_parse_rejects_unknown() {
        assert_eq!(LevelId::parse("level3"), LevelId::new(3));
        assert_eq!(LevelId::parse("level9"), None);
        assert_eq!(LevelId::parse("bonus"), None);
        assert_eq!(LevelId::parse("level"), None);
    }

    #[test]
    fn test_scene_build_order() {
        let order: Vec<Scene> = (0..7).filter_map(Scene::from_build_index).collect();
        assert_eq!(order.len(), 7);
        assert_eq!(order[0], Scene::MainMenu);
        assert_eq!(order[1], Scene::Level(LevelId::FIRST));
        assert_eq!(order[5], Scene::WinScreen);
        assert_eq!(order[6], Scene::LoseScreen);
        for (i, scene) in order.iter().enumerate() {
            assert_eq!(scene.build_index(), i);
        }
        assert_eq!(Scene::from_build_index(7), None);
    }

    #[test]
    fn test_scene_request_resolve() {
        assert_eq!(
            SceneRequest::Name("WinScreen".into()).resolve(),
            Some(Scene::WinScreen)
        );
        assert_eq!(
            SceneRequest::Name("level2".into()).resolve(),
            LevelId::new(2).map(Scene::Level)
        );
        assert_eq!(SceneRequest::Name("Credits".into()).resolve(), None);
        assert_eq!(SceneRequest::Index(1).resolve(), Some(Scene::Level(LevelId::FIRST)));
    }
}
