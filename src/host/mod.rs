//! Host collaborators
//!
//! The respawn scheduler never touches the game world directly. Everything
//! it needs to know or change goes through these traits, implemented by the
//! embedding server (or by [`simulated::SimulatedHost`] in tests and the
//! bundled binary).

pub mod simulated;

use std::sync::Arc;

use crate::respawn::announce::RespawnAnnouncement;
use crate::world::{BattleRecord, Location, WorldId, WorldKind};

pub use simulated::SimulatedHost;

/// Read-only questions about worlds and their boss
pub trait WorldQuery: Send + Sync {
    /// Every world the host currently has loaded
    fn worlds(&self) -> Vec<WorldId>;

    /// Environment kind, or `None` if the world is unknown
    fn world_kind(&self, world: WorldId) -> Option<WorldKind>;

    /// Whether a boss entity is alive in the world
    fn boss_exists(&self, world: WorldId) -> bool;

    /// Display name of the live boss, if there is one and it is named
    fn boss_display_name(&self, world: WorldId) -> Option<String>;

    /// The world's boss battle, including the portal location
    fn battle(&self, world: WorldId) -> Option<BattleRecord>;
}

/// Boss status bar shown to everyone in a world
pub trait BossBar: Send + Sync {
    fn set_title(&self, world: WorldId, title: &str);
}

/// Broadcasts transient messages to the participants of a world
pub trait Notifier: Send + Sync {
    fn announce(&self, announcement: &RespawnAnnouncement);
}

/// Creates the boss entity
pub trait BossSpawner: Send + Sync {
    fn respawn_boss(&self, world: WorldId, location: Location);
}

/// Bundle of host collaborators, cheap to clone
#[derive(Clone)]
pub struct Host {
    pub worlds: Arc<dyn WorldQuery>,
    pub boss_bar: Arc<dyn BossBar>,
    pub notifier: Arc<dyn Notifier>,
    pub spawner: Arc<dyn BossSpawner>,
}

impl Host {
    pub fn new(
        worlds: Arc<dyn WorldQuery>,
        boss_bar: Arc<dyn BossBar>,
        notifier: Arc<dyn Notifier>,
        spawner: Arc<dyn BossSpawner>,
    ) -> Self {
        Self {
            worlds,
            boss_bar,
            notifier,
            spawner,
        }
    }

    /// Use one object for every collaborator
    pub fn from_shared<T>(shared: Arc<T>) -> Self
    where
        T: WorldQuery + BossBar + Notifier + BossSpawner + 'static,
    {
        Self {
            worlds: shared.clone(),
            boss_bar: shared.clone(),
            notifier: shared.clone(),
            spawner: shared,
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
