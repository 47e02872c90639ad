use tracing::info;

use crate::respawn::task::TaskState;
use crate::world::{Location, WorldId};

/// Outcome of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownTick {
    /// Not running, body did not execute
    Skipped,
    /// Still counting, with this many seconds left
    Counting(u32),
    /// Reached zero; the boss is due at this location
    Completed(Location),
}

/// Counts down to a boss respawn, one second per tick
#[derive(Debug, Clone)]
pub struct CountdownTask {
    world: WorldId,
    state: TaskState,
    remaining: u32,
    location: Location,
}

impl CountdownTask {
    pub fn new(world: WorldId, delay_secs: u32, location: Location) -> Self {
        Self {
            world,
            state: TaskState::NotStarted,
            remaining: delay_secs,
            location,
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

    pub fn seconds_until_respawn(&self) -> u32 {
        self.remaining
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Advance by one second. On reaching zero the task cancels itself and
    /// reports `Completed` exactly once; spawning is left to the caller.
    pub fn tick(&mut self) -> CountdownTick {
        if !self.state.is_active() {
            return CountdownTick::Skipped;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return CountdownTick::Counting(self.remaining);
        }

        self.state.cancel();
        info!("World {}: countdown finished, boss due at {}", self.world, self.location);

        CountdownTick::Completed(self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn portal() -> Location {
        Location::new(0.0, 64.0, 0.0)
    }

    #[test]
    fn test_not_started_does_not_tick() {
        let mut task = CountdownTask::new(Uuid::new_v4(), 3, portal());

        assert_eq!(task.tick(), CountdownTick::Skipped);
        assert_eq!(task.seconds_until_respawn(), 3);
    }

    #[test]
    fn test_counts_down_and_completes_once() {
        let mut task = CountdownTask::new(Uuid::new_v4(), 3, portal());
        task.start();

        assert_eq!(task.tick(), CountdownTick::Counting(2));
        assert_eq!(task.tick(), CountdownTick::Counting(1));
        assert_eq!(task.tick(), CountdownTick::Completed(portal()));
        assert_eq!(task.seconds_until_respawn(), 0);
        assert!(!task.is_active());

        // Further ticks do nothing
        assert_eq!(task.tick(), CountdownTick::Skipped);
        assert_eq!(task.tick(), CountdownTick::Skipped);
    }

    #[test]
    fn test_cancel_prevents_completion() {
        let mut task = CountdownTask::new(Uuid::new_v4(), 2, portal());
        task.start();

        task.tick();
        task.cancel();

        assert_eq!(task.tick(), CountdownTick::Skipped);
        assert_eq!(task.seconds_until_respawn(), 1);
    }

    #[test]
    fn test_zero_delay_completes_on_first_tick() {
        let mut task = CountdownTask::new(Uuid::new_v4(), 0, portal());
        task.start();

        assert!(matches!(task.tick(), CountdownTick::Completed(_)));
        assert_eq!(task.state(), TaskState::Cancelled);
    }
}
