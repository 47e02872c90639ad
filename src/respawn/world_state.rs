use tracing::{debug, info};

use crate::host::Host;
use crate::respawn::announce::{AnnounceTick, AnnouncementTask, CountdownSource};
use crate::respawn::countdown::{CountdownTick, CountdownTask};
use crate::respawn::{RespawnError, RespawnEvent, RespawnTrigger, SharedConfig};
use crate::world::WorldId;

/// Respawn state of one arena world
///
/// Owns at most one countdown and one announcement task. The in-progress
/// guard is set by whoever performs the actual boss creation and blocks new
/// countdowns while it is up.
pub struct WorldRespawnState {
    world: WorldId,
    host: Host,
    config: SharedConfig,
    respawn_task: Option<CountdownTask>,
    announce_task: Option<AnnouncementTask>,
    respawn_in_progress: bool,
}

impl WorldRespawnState {
    /// Fails unless the host knows `world` and it is an arena world
    pub fn new(world: WorldId, host: Host, config: SharedConfig) -> Result<Self, RespawnError> {
        let kind = host
            .worlds
            .world_kind(world)
            .ok_or(RespawnError::UnknownWorld(world))?;

        if !kind.is_arena() {
            return Err(RespawnError::NotArenaWorld { world, kind });
        }

        Ok(Self {
            world,
            host,
            config,
            respawn_task: None,
            announce_task: None,
            respawn_in_progress: false,
        })
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    /// Begin counting down to a boss respawn.
    ///
    /// Returns `Ok(false)` without touching anything when the boss is alive,
    /// a respawn is in progress, or a countdown is already running.
    pub fn start_respawn(&mut self, trigger: RespawnTrigger) -> Result<bool, RespawnError> {
        if self.host.worlds.boss_exists(self.world) || self.respawn_in_progress {
            debug!("World {}: {} respawn not needed right now", self.world, trigger);
            return Ok(false);
        }

        if self.has_active_countdown() {
            return Ok(false);
        }

        let (delay, announce, template) = {
            let config = self.config.read();
            (
                trigger.delay_secs(&config),
                config.announce_respawn,
                config.announce_message.clone(),
            )
        };

        let battle = self
            .host
            .worlds
            .battle(self.world)
            .ok_or(RespawnError::NoBattle(self.world))?;

        let mut countdown = CountdownTask::new(self.world, delay, battle.portal_location);
        countdown.start();
        self.respawn_task = Some(countdown);

        if announce {
            let mut announcement = AnnouncementTask::new(self.world, template);
            announcement.start();
            self.announce_task = Some(announcement);
        }

        info!(
            "World {}: boss respawn in {}s ({} trigger)",
            self.world, delay, trigger
        );
        Ok(true)
    }

    /// Cancel the countdown, if any. Returns whether one was cancelled.
    pub fn stop_respawn(&mut self) -> bool {
        let Some(mut task) = self.respawn_task.take() else {
            return false;
        };

        task.cancel();
        if self.config.read().announce_respawn {
            self.cancel_announce();
        }

        info!(
            "World {}: respawn countdown stopped at {}s",
            self.world,
            task.seconds_until_respawn()
        );
        true
    }

    /// Cancel only the announcement task
    pub fn cancel_announce(&mut self) {
        if let Some(mut task) = self.announce_task.take() {
            task.cancel();
        }
    }

    pub fn set_respawn_in_progress(&mut self, value: bool) {
        self.respawn_in_progress = value;
    }

    pub fn is_respawn_in_progress(&self) -> bool {
        self.respawn_in_progress
    }

    pub fn has_active_countdown(&self) -> bool {
        self.respawn_task.as_ref().is_some_and(CountdownTask::is_active)
    }

    pub fn has_active_announcement(&self) -> bool {
        self.announce_task.as_ref().is_some_and(AnnouncementTask::is_active)
    }

    /// Seconds left on the active countdown, `None` if there is none
    pub fn time_until_respawn(&self) -> Option<u32> {
        self.respawn_task
            .as_ref()
            .filter(|task| task.is_active())
            .map(CountdownTask::seconds_until_respawn)
    }

    /// Run one step of both tasks: the countdown first, then the
    /// announcement, which reads the countdown through this state.
    ///
    /// The returned events have not reached the host yet; dispatch them
    /// after releasing this state.
    pub fn tick(&mut self) -> Vec<RespawnEvent> {
        let mut events = Vec::new();

        if let Some(task) = self.respawn_task.as_mut() {
            if let CountdownTick::Completed(location) = task.tick() {
                events.push(RespawnEvent::BossRespawned {
                    world: self.world,
                    location,
                });
            }
        }
        if !self.has_active_countdown() {
            self.respawn_task = None;
        }

        if let Some(mut announcement) = self.announce_task.take() {
            if let AnnounceTick::Announced(message) = announcement.tick(&*self) {
                events.push(RespawnEvent::Announced(message));
            }
            if announcement.is_active() {
                self.announce_task = Some(announcement);
            }
        }

        events
    }
}

impl CountdownSource for WorldRespawnState {
    fn time_until_respawn(&self) -> Option<u32> {
        WorldRespawnState::time_until_respawn(self)
    }
}

impl std::fmt::Debug for WorldRespawnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldRespawnState")
            .field("world", &self.world)
            .field("respawn_task", &self.respawn_task)
            .field("announce_task", &self.announce_task)
            .field("respawn_in_progress", &self.respawn_in_progress)
            .finish()
    }
}
