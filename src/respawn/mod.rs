//! Boss respawn scheduling
//!
//! Each arena world gets a [`WorldRespawnState`] that gates and owns at most
//! one countdown (plus its announcement task). The [`RespawnRegistry`] hands
//! out those states, keeps the boss template list and the current battle,
//! and advances every world by one step per [`RespawnRegistry::tick`].

pub mod announce;
pub mod countdown;
pub mod driver;
pub mod registry;
pub mod task;
pub mod world_state;

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::config::RespawnConfig;
use crate::host::Host;
use crate::world::{Location, WorldId, WorldKind};

use announce::RespawnAnnouncement;

pub use registry::{RespawnRegistry, WorldHandle};
pub use task::TaskState;
pub use world_state::WorldRespawnState;

/// Configuration shared by the registry and every world state. Values are
/// read when a respawn starts or stops, so updates apply to the next call.
pub type SharedConfig = Arc<RwLock<RespawnConfig>>;

/// Why a respawn was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RespawnTrigger {
    /// A participant joined the world
    Join,
    /// The boss was killed
    Death,
}

impl RespawnTrigger {
    /// Countdown length configured for this trigger
    pub fn delay_secs(&self, config: &RespawnConfig) -> u32 {
        match self {
            RespawnTrigger::Join => config.join_respawn_delay,
            RespawnTrigger::Death => config.death_respawn_delay,
        }
    }
}

impl fmt::Display for RespawnTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespawnTrigger::Join => write!(f, "join"),
            RespawnTrigger::Death => write!(f, "death"),
        }
    }
}

/// Something that happened while ticking.
///
/// Ticking a world only produces events; the host collaborators act on them
/// through [`RespawnEvent::dispatch`] once the world's lock is released, so
/// a collaborator may call back into the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum RespawnEvent {
    /// Remaining time to broadcast to the world
    Announced(RespawnAnnouncement),
    /// A countdown reached zero and the boss is due
    BossRespawned { world: WorldId, location: Location },
}

impl RespawnEvent {
    pub fn world(&self) -> WorldId {
        match self {
            RespawnEvent::Announced(announcement) => announcement.world,
            RespawnEvent::BossRespawned { world, .. } => *world,
        }
    }

    /// Hand the event to the collaborator that acts on it
    pub fn dispatch(&self, host: &Host) {
        match self {
            RespawnEvent::Announced(announcement) => host.notifier.announce(announcement),
            RespawnEvent::BossRespawned { world, location } => {
                info!("Respawning boss in world {} at {}", world, location);
                host.spawner.respawn_boss(*world, *location);
            }
        }
    }
}

/// Respawn errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RespawnError {
    #[error("World {world} is a {kind} world, respawn tracking needs an arena world")]
    NotArenaWorld { world: WorldId, kind: WorldKind },
    #[error("World {0} is not known to the host")]
    UnknownWorld(WorldId),
    #[error("World {0} has no boss battle to respawn into")]
    NoBattle(WorldId),
}
