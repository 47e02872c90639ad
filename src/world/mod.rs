//! World identity and placement types
//!
//! Worlds are owned by the host; this crate only refers to them by id and
//! asks the host about their environment and boss battle.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique world identifier
pub type WorldId = Uuid;

/// Environment kind of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldKind {
    Overworld,
    Nether,
    /// The only kind that hosts a boss battle
    Arena,
}

impl WorldKind {
    pub fn is_arena(&self) -> bool {
        matches!(self, WorldKind::Arena)
    }
}

impl fmt::Display for WorldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldKind::Overworld => write!(f, "overworld"),
            WorldKind::Nether => write!(f, "nether"),
            WorldKind::Arena => write!(f, "arena"),
        }
    }
}

/// Block-space position inside a world
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// The host's record of a world's boss battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    /// Canonical respawn location (the exit portal)
    pub portal_location: Location,
    /// Title currently shown on the boss bar, if any
    pub boss_bar_title: Option<String>,
}

impl BattleRecord {
    pub fn new(portal_location: Location) -> Self {
        Self {
            portal_location,
            boss_bar_title: None,
        }
    }
}
