//! Tick loop - drives every world's countdown and announcement tasks

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::respawn::{RespawnEvent, RespawnRegistry};

/// How often (in ticks) to log a status line
const STATUS_EVERY_TICKS: u64 = 60;

/// Start the respawn tick loop as a background task.
///
/// The first tick fires one `period` after the call, so a countdown started
/// right away still shows its full delay until then. Abort the returned
/// handle to stop ticking.
pub fn start_tick_loop(registry: Arc<RespawnRegistry>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Respawn tick loop started ({}ms interval)", period.as_millis());
        let mut tick_count: u64 = 0;

        loop {
            ticker.tick().await;
            tick_count += 1;

            #[cfg(feature = "metrics")]
            let started = std::time::Instant::now();

            let events = registry.tick();

            #[cfg(feature = "metrics")]
            registry.metrics().record_tick_time(started.elapsed());

            for event in &events {
                match event {
                    RespawnEvent::BossRespawned { world, location } => {
                        info!("World {}: boss respawned at {}", world, location);
                    }
                    RespawnEvent::Announced(announcement) => {
                        debug!(
                            "World {}: {}s until respawn",
                            announcement.world, announcement.seconds_remaining
                        );
                    }
                }
            }

            if tick_count % STATUS_EVERY_TICKS == 0 {
                info!(
                    "Respawn: tick {}, {} worlds tracked, {} counting down",
                    tick_count,
                    registry.world_count(),
                    registry.active_countdowns()
                );
            }
        }
    })
}
