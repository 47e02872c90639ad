use std::sync::Arc;
use tracing::{info, warn};
#[cfg(feature = "metrics")]
use tracing::error;
use tracing_subscriber::EnvFilter;

use arena_respawn::config::RespawnConfig;
use arena_respawn::host::{Host, SimulatedHost};
use arena_respawn::respawn::driver::start_tick_loop;
use arena_respawn::respawn::{RespawnRegistry, RespawnTrigger};
use arena_respawn::template::JsonTemplateSource;
use arena_respawn::world::WorldKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Arena Respawn v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = RespawnConfig::load_or_default();
    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", e);
    }
    info!(
        "Configuration loaded: join={}s, death={}s, announce={}, templates={}",
        config.join_respawn_delay,
        config.death_respawn_delay,
        config.announce_respawn,
        config.templates_dir.display()
    );

    // Simulated host with a single arena
    let sim = Arc::new(SimulatedHost::new());
    let arena = sim.add_world(WorldKind::Arena);

    let tick_interval = config.tick_interval;
    #[cfg(feature = "metrics")]
    let metrics_port = config.metrics_port;

    let registry = Arc::new(RespawnRegistry::new(
        Host::from_shared(sim.clone()),
        Arc::new(JsonTemplateSource::new(config.templates_dir.clone())),
        config,
    ));

    if let Some(template) = registry.templates().first() {
        registry.set_current_battle(template.clone());
        info!("Current battle: {}", template.name);
    } else {
        warn!("No boss templates loaded");
    }

    #[cfg(feature = "metrics")]
    {
        let metrics = registry.metrics();
        tokio::spawn(async move {
            if let Err(e) = arena_respawn::metrics::start_metrics_server(metrics, metrics_port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    let tick_loop = start_tick_loop(registry.clone(), tick_interval);

    // A participant arrives in a boss-less arena
    registry.start_respawn(arena, RespawnTrigger::Join)?;

    // Shutdown signal handler
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received");

    // Cleanup
    tick_loop.abort();
    let stopped = registry.stop_all();
    if stopped > 0 {
        info!("Stopped {} pending countdowns", stopped);
    }
    info!("Respawn scheduler stopped");

    Ok(())
}
