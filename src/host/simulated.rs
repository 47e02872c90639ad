//! In-memory host used by the bundled binary and by tests
//!
//! Keeps a table of worlds with their boss and battle record, and records
//! every side effect the scheduler asks for so callers can inspect them.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::host::{BossBar, BossSpawner, Notifier, WorldQuery};
use crate::respawn::announce::RespawnAnnouncement;
use crate::world::{BattleRecord, Location, WorldId, WorldKind};

/// Default exit portal position for newly created arena worlds
pub const DEFAULT_PORTAL: Location = Location {
    x: 0.0,
    y: 64.0,
    z: 0.0,
};

#[derive(Debug, Clone)]
struct SimWorld {
    kind: WorldKind,
    /// `Some` while a boss is alive; the inner value is its custom name
    boss: Option<Option<String>>,
    battle: Option<BattleRecord>,
}

/// Recorded call to [`BossSpawner::respawn_boss`]
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRecord {
    pub world: WorldId,
    pub location: Location,
}

#[derive(Debug, Default)]
pub struct SimulatedHost {
    worlds: RwLock<HashMap<WorldId, SimWorld>>,
    announcements: Mutex<Vec<RespawnAnnouncement>>,
    spawns: Mutex<Vec<SpawnRecord>>,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a world of the given kind. Arena worlds get a battle record with
    /// the portal at [`DEFAULT_PORTAL`].
    pub fn add_world(&self, kind: WorldKind) -> WorldId {
        let id = Uuid::new_v4();
        let battle = kind.is_arena().then(|| BattleRecord::new(DEFAULT_PORTAL));
        self.worlds.write().insert(
            id,
            SimWorld {
                kind,
                boss: None,
                battle,
            },
        );
        id
    }

    /// Remove the battle record, as if the host could not resolve it
    pub fn clear_battle(&self, world: WorldId) {
        if let Some(w) = self.worlds.write().get_mut(&world) {
            w.battle = None;
        }
    }

    pub fn set_portal(&self, world: WorldId, location: Location) {
        if let Some(battle) = self
            .worlds
            .write()
            .get_mut(&world)
            .and_then(|w| w.battle.as_mut())
        {
            battle.portal_location = location;
        }
    }

    /// Place a live boss, optionally with a custom name
    pub fn spawn_boss(&self, world: WorldId, name: Option<&str>) {
        if let Some(w) = self.worlds.write().get_mut(&world) {
            w.boss = Some(name.map(str::to_string));
        }
    }

    pub fn kill_boss(&self, world: WorldId) {
        if let Some(w) = self.worlds.write().get_mut(&world) {
            w.boss = None;
        }
    }

    pub fn boss_bar_title(&self, world: WorldId) -> Option<String> {
        self.worlds
            .read()
            .get(&world)
            .and_then(|w| w.battle.as_ref())
            .and_then(|b| b.boss_bar_title.clone())
    }

    pub fn announcements(&self) -> Vec<RespawnAnnouncement> {
        self.announcements.lock().clone()
    }

    pub fn spawns(&self) -> Vec<SpawnRecord> {
        self.spawns.lock().clone()
    }
}

impl WorldQuery for SimulatedHost {
    fn worlds(&self) -> Vec<WorldId> {
        self.worlds.read().keys().copied().collect()
    }

    fn world_kind(&self, world: WorldId) -> Option<WorldKind> {
        self.worlds.read().get(&world).map(|w| w.kind)
    }

    fn boss_exists(&self, world: WorldId) -> bool {
        self.worlds
            .read()
            .get(&world)
            .is_some_and(|w| w.boss.is_some())
    }

    fn boss_display_name(&self, world: WorldId) -> Option<String> {
        self.worlds
            .read()
            .get(&world)
            .and_then(|w| w.boss.clone())
            .flatten()
    }

    fn battle(&self, world: WorldId) -> Option<BattleRecord> {
        self.worlds.read().get(&world).and_then(|w| w.battle.clone())
    }
}

impl BossBar for SimulatedHost {
    fn set_title(&self, world: WorldId, title: &str) {
        if let Some(battle) = self
            .worlds
            .write()
            .get_mut(&world)
            .and_then(|w| w.battle.as_mut())
        {
            battle.boss_bar_title = Some(title.to_string());
        }
    }
}

impl Notifier for SimulatedHost {
    fn announce(&self, announcement: &RespawnAnnouncement) {
        self.announcements.lock().push(announcement.clone());
    }
}

impl BossSpawner for SimulatedHost {
    fn respawn_boss(&self, world: WorldId, location: Location) {
        info!("Simulated boss spawned in world {} at {}", world, location);
        self.spawns.lock().push(SpawnRecord { world, location });

        let mut worlds = self.worlds.write();
        if let Some(w) = worlds.get_mut(&world) {
            let name = w.battle.as_ref().and_then(|b| b.boss_bar_title.clone());
            w.boss = Some(name);
        }
    }
}
