use parking_lot::{Mutex, RwLock};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[cfg(feature = "metrics")]
use crate::metrics::Metrics;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::config::RespawnConfig;
use crate::host::Host;
use crate::respawn::{RespawnError, RespawnEvent, RespawnTrigger, SharedConfig, WorldRespawnState};
use crate::template::{BossTemplate, TemplateSource};
use crate::world::WorldId;

/// Shared handle to one world's respawn state
pub type WorldHandle = Arc<Mutex<WorldRespawnState>>;

/// Process-wide entry point to per-world respawn state
pub struct RespawnRegistry {
    host: Host,
    template_source: Arc<dyn TemplateSource>,
    config: SharedConfig,
    worlds: RwLock<HashMap<WorldId, WorldHandle>>,
    templates: RwLock<Arc<[BossTemplate]>>,
    current_battle: RwLock<Option<BossTemplate>>,
    #[cfg(feature = "metrics")]
    metrics: Arc<Metrics>,
}

impl RespawnRegistry {
    /// Build the registry, load templates and sync boss bar titles
    pub fn new(host: Host, template_source: Arc<dyn TemplateSource>, config: RespawnConfig) -> Self {
        let registry = Self {
            host,
            template_source,
            config: Arc::new(RwLock::new(config)),
            worlds: RwLock::new(HashMap::new()),
            templates: RwLock::new(Arc::from(Vec::new())),
            current_battle: RwLock::new(None),
            #[cfg(feature = "metrics")]
            metrics: Arc::new(Metrics::new()),
        };

        registry.reload_templates();
        registry.sync_boss_bar_titles();
        registry
    }

    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Get the state for `world`, creating it on first use.
    ///
    /// Fails if the host does not know the world or it is not an arena.
    pub fn world_state(&self, world: WorldId) -> Result<WorldHandle, RespawnError> {
        if let Some(handle) = self.worlds.read().get(&world) {
            return Ok(handle.clone());
        }

        let mut worlds = self.worlds.write();
        let handle = match worlds.entry(world) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let state = WorldRespawnState::new(world, self.host.clone(), self.config.clone())?;
                debug!("Tracking respawns for world {}", world);
                entry.insert(Arc::new(Mutex::new(state))).clone()
            }
        };

        #[cfg(feature = "metrics")]
        self.metrics
            .worlds_tracked
            .store(worlds.len() as u64, Ordering::Relaxed);

        Ok(handle)
    }

    pub fn start_respawn(&self, world: WorldId, trigger: RespawnTrigger) -> Result<bool, RespawnError> {
        let started = self.world_state(world)?.lock().start_respawn(trigger)?;

        #[cfg(feature = "metrics")]
        {
            if started {
                self.metrics.respawns_started.fetch_add(1, Ordering::Relaxed);
            }
        }

        Ok(started)
    }

    pub fn stop_respawn(&self, world: WorldId) -> Result<bool, RespawnError> {
        let stopped = self.world_state(world)?.lock().stop_respawn();

        #[cfg(feature = "metrics")]
        {
            if stopped {
                self.metrics.respawns_cancelled.fetch_add(1, Ordering::Relaxed);
            }
        }

        Ok(stopped)
    }

    pub fn cancel_announce(&self, world: WorldId) -> Result<(), RespawnError> {
        self.world_state(world)?.lock().cancel_announce();
        Ok(())
    }

    pub fn is_respawn_in_progress(&self, world: WorldId) -> Result<bool, RespawnError> {
        Ok(self.world_state(world)?.lock().is_respawn_in_progress())
    }

    pub fn set_respawn_in_progress(&self, world: WorldId, value: bool) -> Result<(), RespawnError> {
        self.world_state(world)?.lock().set_respawn_in_progress(value);
        Ok(())
    }

    /// Seconds left on the world's countdown, `None` if none is active
    pub fn time_until_respawn(&self, world: WorldId) -> Result<Option<u32>, RespawnError> {
        Ok(self.world_state(world)?.lock().time_until_respawn())
    }

    /// Replace the template list with a freshly loaded one. Readers see
    /// either the old list or the new one, never a mix.
    pub fn reload_templates(&self) {
        let loaded: Arc<[BossTemplate]> = self.template_source.load_templates().into();
        info!("Loaded {} boss templates", loaded.len());

        #[cfg(feature = "metrics")]
        self.metrics
            .templates_loaded
            .store(loaded.len() as u64, Ordering::Relaxed);

        *self.templates.write() = loaded;
    }

    pub fn clear_templates(&self) {
        *self.templates.write() = Arc::from(Vec::new());

        #[cfg(feature = "metrics")]
        self.metrics.templates_loaded.store(0, Ordering::Relaxed);
    }

    /// Snapshot of the current template list
    pub fn templates(&self) -> Arc<[BossTemplate]> {
        self.templates.read().clone()
    }

    pub fn set_current_battle(&self, template: BossTemplate) {
        *self.current_battle.write() = Some(template);
    }

    /// Template of the current (or most recent) battle
    pub fn current_battle(&self) -> Option<BossTemplate> {
        self.current_battle.read().clone()
    }

    pub fn config(&self) -> RespawnConfig {
        self.config.read().clone()
    }

    /// Swap the configuration. Delays and the announcement toggle apply
    /// from the next start or stop.
    pub fn update_config(&self, config: RespawnConfig) {
        *self.config.write() = config;
    }

    /// Ids of every world with a respawn state
    pub fn world_ids(&self) -> Vec<WorldId> {
        self.worlds.read().keys().copied().collect()
    }

    pub fn world_count(&self) -> usize {
        self.worlds.read().len()
    }

    /// Number of worlds currently counting down
    pub fn active_countdowns(&self) -> usize {
        self.handles()
            .iter()
            .filter(|handle| handle.lock().has_active_countdown())
            .count()
    }

    /// Push each live, named boss's name onto its world's boss bar.
    ///
    /// Visits every arena world the host reports, tracked or not, and creates
    /// no world states.
    pub fn sync_boss_bar_titles(&self) {
        for world in self.host.worlds.worlds() {
            if !self
                .host
                .worlds
                .world_kind(world)
                .is_some_and(|kind| kind.is_arena())
            {
                continue;
            }
            if !self.host.worlds.boss_exists(world) {
                continue;
            }

            match self.host.worlds.boss_display_name(world) {
                Some(name) if !name.is_empty() => {
                    debug!("World {}: boss bar title set to '{}'", world, name);
                    self.host.boss_bar.set_title(world, &name);
                }
                _ => {}
            }
        }
    }

    /// Advance every world by one tick.
    ///
    /// Each world is locked only while its tasks step; the resulting events
    /// are dispatched to the host afterwards, so a spawner or notifier may
    /// call back into the registry for the same world.
    pub fn tick(&self) -> Vec<RespawnEvent> {
        let mut events = Vec::new();
        #[cfg(feature = "metrics")]
        let mut active = 0u64;

        for handle in self.handles() {
            let world_events = {
                let mut state = handle.lock();
                let world_events = state.tick();

                #[cfg(feature = "metrics")]
                {
                    if state.has_active_countdown() {
                        active += 1;
                    }
                }

                world_events
            };

            for event in &world_events {
                event.dispatch(&self.host);
            }
            events.extend(world_events);
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.tick_count.fetch_add(1, Ordering::Relaxed);
            self.metrics.active_countdowns.store(active, Ordering::Relaxed);
            for event in &events {
                match event {
                    RespawnEvent::Announced(_) => {
                        self.metrics.announcements_sent.fetch_add(1, Ordering::Relaxed);
                    }
                    RespawnEvent::BossRespawned { .. } => {
                        self.metrics.respawns_completed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }

        events
    }

    /// Stop every running countdown, returning how many were stopped
    pub fn stop_all(&self) -> usize {
        let stopped = self
            .handles()
            .iter()
            .filter(|handle| handle.lock().stop_respawn())
            .count();

        #[cfg(feature = "metrics")]
        self.metrics
            .respawns_cancelled
            .fetch_add(stopped as u64, Ordering::Relaxed);

        stopped
    }

    /// Clone the handles out so no world is locked under the map lock
    fn handles(&self) -> Vec<WorldHandle> {
        self.worlds.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BossSpawner, SimulatedHost};
    use crate::template::StaticTemplateSource;
    use crate::world::{Location, WorldKind};
    use std::sync::mpsc;
    use std::sync::{OnceLock, Weak};
    use std::thread;
    use std::time::Duration;

    fn templates() -> Vec<BossTemplate> {
        vec![
            BossTemplate::new("ancient", "Ancient Dragon"),
            BossTemplate::new("frost", "Frost Dragon"),
        ]
    }

    fn create_registry(host: &Arc<SimulatedHost>) -> RespawnRegistry {
        RespawnRegistry::new(
            Host::from_shared(host.clone()),
            Arc::new(StaticTemplateSource::new(templates())),
            RespawnConfig {
                join_respawn_delay: 3,
                death_respawn_delay: 6,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_world_state_is_cached() {
        let host = Arc::new(SimulatedHost::new());
        let world = host.add_world(WorldKind::Arena);
        let registry = create_registry(&host);

        let first = registry.world_state(world).unwrap();
        let second = registry.world_state(world).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.world_count(), 1);
        assert_eq!(registry.world_ids(), vec![world]);
    }

    #[test]
    fn test_world_state_rejects_overworld() {
        let host = Arc::new(SimulatedHost::new());
        let overworld = host.add_world(WorldKind::Overworld);
        let registry = create_registry(&host);

        assert!(matches!(
            registry.world_state(overworld),
            Err(RespawnError::NotArenaWorld { .. })
        ));
        assert_eq!(registry.world_count(), 0);
    }

    #[test]
    fn test_templates_loaded_at_construction() {
        let host = Arc::new(SimulatedHost::new());
        let registry = create_registry(&host);

        let loaded = registry.templates();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].identifier, "ancient");
    }

    #[test]
    fn test_template_snapshot_survives_clear() {
        let host = Arc::new(SimulatedHost::new());
        let registry = create_registry(&host);

        let before = registry.templates();
        registry.clear_templates();

        assert_eq!(before.len(), 2);
        assert!(registry.templates().is_empty());

        registry.reload_templates();
        assert_eq!(registry.templates().len(), 2);
    }

    #[test]
    fn test_current_battle_last_write_wins() {
        let host = Arc::new(SimulatedHost::new());
        let registry = create_registry(&host);
        assert!(registry.current_battle().is_none());

        let loaded = registry.templates();
        registry.set_current_battle(loaded[0].clone());
        registry.set_current_battle(loaded[1].clone());

        assert_eq!(registry.current_battle().unwrap().identifier, "frost");
    }

    #[test]
    fn test_title_sync_at_construction() {
        let host = Arc::new(SimulatedHost::new());
        let named = host.add_world(WorldKind::Arena);
        let unnamed = host.add_world(WorldKind::Arena);
        let empty = host.add_world(WorldKind::Arena);
        let bossless = host.add_world(WorldKind::Arena);
        host.spawn_boss(named, Some("Frost Dragon"));
        host.spawn_boss(unnamed, None);
        host.spawn_boss(empty, Some(""));

        let _registry = create_registry(&host);

        assert_eq!(host.boss_bar_title(named).as_deref(), Some("Frost Dragon"));
        assert!(host.boss_bar_title(unnamed).is_none());
        assert!(host.boss_bar_title(empty).is_none());
        assert!(host.boss_bar_title(bossless).is_none());
    }

    #[test]
    fn test_facade_round_trip() {
        let host = Arc::new(SimulatedHost::new());
        let world = host.add_world(WorldKind::Arena);
        let registry = create_registry(&host);

        assert!(registry.start_respawn(world, RespawnTrigger::Death).unwrap());
        assert_eq!(registry.time_until_respawn(world).unwrap(), Some(6));
        assert_eq!(registry.active_countdowns(), 1);

        registry.set_respawn_in_progress(world, true).unwrap();
        assert!(registry.is_respawn_in_progress(world).unwrap());

        assert!(registry.stop_respawn(world).unwrap());
        assert_eq!(registry.time_until_respawn(world).unwrap(), None);
        assert!(!registry.start_respawn(world, RespawnTrigger::Join).unwrap());
    }

    #[test]
    fn test_tick_advances_all_worlds() {
        let host = Arc::new(SimulatedHost::new());
        let a = host.add_world(WorldKind::Arena);
        let b = host.add_world(WorldKind::Arena);
        let registry = create_registry(&host);

        registry.start_respawn(a, RespawnTrigger::Join).unwrap();
        registry.start_respawn(b, RespawnTrigger::Death).unwrap();

        for _ in 0..3 {
            registry.tick();
        }

        assert_eq!(registry.time_until_respawn(a).unwrap(), None);
        assert_eq!(registry.time_until_respawn(b).unwrap(), Some(3));
        assert_eq!(host.spawns().len(), 1);
        assert_eq!(host.spawns()[0].world, a);
    }

    #[test]
    fn test_update_config_applies_to_next_start() {
        let host = Arc::new(SimulatedHost::new());
        let world = host.add_world(WorldKind::Arena);
        let registry = create_registry(&host);

        registry.update_config(RespawnConfig {
            join_respawn_delay: 11,
            ..registry.config()
        });
        registry.start_respawn(world, RespawnTrigger::Join).unwrap();

        assert_eq!(registry.time_until_respawn(world).unwrap(), Some(11));
    }

    #[test]
    fn test_stop_all() {
        let host = Arc::new(SimulatedHost::new());
        let a = host.add_world(WorldKind::Arena);
        let b = host.add_world(WorldKind::Arena);
        let registry = create_registry(&host);
        registry.start_respawn(a, RespawnTrigger::Join).unwrap();
        registry.world_state(b).unwrap();

        assert_eq!(registry.stop_all(), 1);
        assert_eq!(registry.active_countdowns(), 0);
    }

    /// Spawner that marks the respawn as in progress through the registry,
    /// the way a real boss-creation routine would
    struct GuardingSpawner {
        sim: Arc<SimulatedHost>,
        registry: OnceLock<Weak<RespawnRegistry>>,
    }

    impl BossSpawner for GuardingSpawner {
        fn respawn_boss(&self, world: WorldId, location: Location) {
            if let Some(registry) = self.registry.get().and_then(Weak::upgrade) {
                registry.set_respawn_in_progress(world, true).unwrap();
                assert_eq!(registry.time_until_respawn(world).unwrap(), None);
            }
            self.sim.respawn_boss(world, location);
        }
    }

    #[test]
    fn test_spawner_may_reenter_registry() {
        let sim = Arc::new(SimulatedHost::new());
        let world = sim.add_world(WorldKind::Arena);
        let spawner = Arc::new(GuardingSpawner {
            sim: sim.clone(),
            registry: OnceLock::new(),
        });
        let host = Host::new(sim.clone(), sim.clone(), sim.clone(), spawner.clone());
        let registry = Arc::new(RespawnRegistry::new(
            host,
            Arc::new(StaticTemplateSource::new(templates())),
            RespawnConfig {
                join_respawn_delay: 1,
                ..Default::default()
            },
        ));
        spawner.registry.set(Arc::downgrade(&registry)).unwrap();

        registry.start_respawn(world, RespawnTrigger::Join).unwrap();

        let (tx, rx) = mpsc::channel();
        let ticker = {
            let registry = registry.clone();
            thread::spawn(move || {
                tx.send(registry.tick()).unwrap();
            })
        };
        let events = rx
            .recv_timeout(Duration::from_secs(3))
            .expect("tick blocked while the spawner re-entered the registry");
        ticker.join().unwrap();

        assert!(matches!(events.as_slice(), [RespawnEvent::BossRespawned { .. }]));
        assert_eq!(sim.spawns().len(), 1);
        assert!(registry.is_respawn_in_progress(world).unwrap());

        // The guard blocks the next start even once the boss is gone again
        sim.kill_boss(world);
        assert!(!registry.start_respawn(world, RespawnTrigger::Death).unwrap());
        assert_eq!(registry.time_until_respawn(world).unwrap(), None);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_metrics_track_lifecycle() {
        let host = Arc::new(SimulatedHost::new());
        let world = host.add_world(WorldKind::Arena);
        let registry = create_registry(&host);
        let metrics = registry.metrics();

        registry.start_respawn(world, RespawnTrigger::Join).unwrap();
        for _ in 0..3 {
            registry.tick();
        }

        assert_eq!(metrics.respawns_started.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.respawns_completed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.announcements_sent.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.templates_loaded.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.worlds_tracked.load(Ordering::Relaxed), 1);
    }
}
