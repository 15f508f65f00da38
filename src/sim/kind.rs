//! Entity kinds and the collision reaction table

use serde::{Deserialize, Serialize};

/// Closed set of entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Rock,
    /// Friendly shot
    PlayerAmmo,
    /// Enemy shot
    HostileAmmo,
    /// Boundary strip below the player
    EndZone,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Player,
        EntityKind::Enemy,
        EntityKind::Rock,
        EntityKind::PlayerAmmo,
        EntityKind::HostileAmmo,
        EntityKind::EndZone,
    ];

    /// Collision tag as used by level data and logs
    pub fn tag(self) -> &'static str {
        match self {
            EntityKind::Player => "Player",
            EntityKind::Enemy => "Enemy",
            EntityKind::Rock => "Rock",
            EntityKind::PlayerAmmo => "Ammo",
            EntityKind::HostileAmmo => "Ammo_Hostile",
            EntityKind::EndZone => "End",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Whether this kind carries a hit counter
    pub fn is_destructible(self) -> bool {
        matches!(self, EntityKind::Enemy | EntityKind::Rock)
    }

    pub fn is_ammo(self) -> bool {
        matches!(self, EntityKind::PlayerAmmo | EntityKind::HostileAmmo)
    }
}

/// What happens to `subject` when it starts touching `other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Ignore,
    /// Decrement the hit counter by one
    Damage,
    /// Remove immediately
    Despawn,
    /// Player loses a life
    LoseLife,
    /// Enemy slipped past the player: the player loses a life and the enemy
    /// is removed without explosion or score
    Breach,
}

/// Reaction table over every ordered pair of kinds
pub fn reaction(subject: EntityKind, other: EntityKind) -> Reaction {
    use EntityKind::*;

    match subject {
        Player => match other {
            HostileAmmo => Reaction::LoseLife,
            Player | Enemy | Rock | PlayerAmmo | EndZone => Reaction::Ignore,
        },
        Enemy => match other {
            PlayerAmmo => Reaction::Damage,
            EndZone => Reaction::Breach,
            Player | Enemy | Rock | HostileAmmo => Reaction::Ignore,
        },
        Rock => match other {
            PlayerAmmo | HostileAmmo => Reaction::Damage,
            Player | Enemy | Rock | EndZone => Reaction::Ignore,
        },
        PlayerAmmo => match other {
            Rock | Enemy | PlayerAmmo | HostileAmmo => Reaction::Despawn,
            Player | EndZone => Reaction::Ignore,
        },
        HostileAmmo => match other {
            Rock | Player | PlayerAmmo | EndZone | Enemy => Reaction::Despawn,
            HostileAmmo => Reaction::Ignore,
        },
        EndZone => Reaction::Ignore,
    }
}
