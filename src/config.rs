use std::path::PathBuf;
use std::time::Duration;

/// Respawn scheduler configuration
#[derive(Debug, Clone)]
pub struct RespawnConfig {
    /// Countdown length (seconds) when a participant joins a boss-less arena
    pub join_respawn_delay: u32,
    /// Countdown length (seconds) after the boss is defeated
    pub death_respawn_delay: u32,
    /// Broadcast the remaining time while counting down
    pub announce_respawn: bool,
    /// Announcement text; `%time%` and `%formatted-time%` are substituted
    pub announce_message: String,
    /// Interval between countdown ticks
    pub tick_interval: Duration,
    /// Directory holding the boss template files
    pub templates_dir: PathBuf,
    /// Port for the metrics HTTP endpoint
    pub metrics_port: u16,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            join_respawn_delay: 60,
            death_respawn_delay: 300,
            announce_respawn: true,
            announce_message: "Boss respawning in %formatted-time%".to_string(),
            tick_interval: Duration::from_secs(1),
            templates_dir: PathBuf::from("dragons"),
            metrics_port: 9090,
        }
    }
}

impl RespawnConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(delay) = std::env::var("JOIN_RESPAWN_DELAY") {
            match delay.parse::<u32>() {
                Ok(parsed) => config.join_respawn_delay = parsed,
                Err(_) => tracing::warn!("Invalid JOIN_RESPAWN_DELAY '{}', using default", delay),
            }
        }

        if let Ok(delay) = std::env::var("DEATH_RESPAWN_DELAY") {
            match delay.parse::<u32>() {
                Ok(parsed) => config.death_respawn_delay = parsed,
                Err(_) => tracing::warn!("Invalid DEATH_RESPAWN_DELAY '{}', using default", delay),
            }
        }

        if let Ok(announce) = std::env::var("ANNOUNCE_RESPAWN") {
            match parse_bool(&announce) {
                Some(parsed) => config.announce_respawn = parsed,
                None => tracing::warn!("Invalid ANNOUNCE_RESPAWN '{}', using default", announce),
            }
        }

        if let Ok(message) = std::env::var("ANNOUNCE_MESSAGE") {
            if !message.trim().is_empty() {
                config.announce_message = message;
            } else {
                tracing::warn!("ANNOUNCE_MESSAGE is empty, using default");
            }
        }

        if let Ok(interval) = std::env::var("TICK_INTERVAL_MS") {
            if let Ok(parsed) = interval.parse::<u64>() {
                if parsed > 0 && parsed <= 60_000 {
                    config.tick_interval = Duration::from_millis(parsed);
                } else {
                    tracing::warn!("TICK_INTERVAL_MS must be 1-60000, using default");
                }
            } else {
                tracing::warn!("Invalid TICK_INTERVAL_MS '{}', using default", interval);
            }
        }

        if let Ok(dir) = std::env::var("TEMPLATES_DIR") {
            config.templates_dir = PathBuf::from(dir);
        }

        if let Ok(port) = std::env::var("METRICS_PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.metrics_port = parsed;
                } else {
                    tracing::warn!("METRICS_PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid METRICS_PORT '{}', using default", port);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() {
            return Err("tick_interval cannot be zero".to_string());
        }
        if self.announce_respawn && self.announce_message.trim().is_empty() {
            return Err("announce_message cannot be empty when announcements are on".to_string());
        }
        if self.metrics_port == 0 {
            return Err("Metrics port cannot be 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
