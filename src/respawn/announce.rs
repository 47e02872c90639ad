use serde::{Deserialize, Serialize};

use crate::respawn::task::TaskState;
use crate::util::time_format::format_seconds;
use crate::world::WorldId;

/// Anything that can report the live time until the next respawn
pub trait CountdownSource {
    /// `None` when no countdown is active
    fn time_until_respawn(&self) -> Option<u32>;
}

/// Message broadcast to a world while its boss is counting down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespawnAnnouncement {
    pub world: WorldId,
    pub seconds_remaining: u32,
    pub message: String,
}

/// Fill `%time%` and `%formatted-time%` in an announcement template
pub fn render_message(template: &str, seconds: u32) -> String {
    template
        .replace("%formatted-time%", &format_seconds(seconds))
        .replace("%time%", &seconds.to_string())
}

/// Outcome of one announcement tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnounceTick {
    Skipped,
    /// Rendered and ready to broadcast
    Announced(RespawnAnnouncement),
    /// The countdown is gone; the task stopped itself
    Finished,
}

/// Periodically tells a world how long until the boss respawns
#[derive(Debug, Clone)]
pub struct AnnouncementTask {
    world: WorldId,
    state: TaskState,
    template: String,
}

impl AnnouncementTask {
    pub fn new(world: WorldId, template: impl Into<String>) -> Self {
        Self {
            world,
            state: TaskState::NotStarted,
            template: template.into(),
        }
    }

    pub fn start(&mut self) {
        self.state.start();
    }

    pub fn cancel(&mut self) {
        self.state.cancel();
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Read the remaining time from `source` and render the message for it.
    /// The value is looked up every tick since the countdown may have been
    /// replaced or stopped in between.
    pub fn tick(&mut self, source: &dyn CountdownSource) -> AnnounceTick {
        if !self.state.is_active() {
            return AnnounceTick::Skipped;
        }

        let Some(seconds) = source.time_until_respawn() else {
            self.state.cancel();
            return AnnounceTick::Finished;
        };

        AnnounceTick::Announced(RespawnAnnouncement {
            world: self.world,
            seconds_remaining: seconds,
            message: render_message(&self.template, seconds),
        })
    }
}
