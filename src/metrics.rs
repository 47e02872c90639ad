//! Prometheus-compatible metrics endpoint
//!
//! Exposes respawn scheduler counters in Prometheus format.
//! Default endpoint: http://localhost:9090/metrics

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Number of tick samples kept for the max tick time
const TICK_HISTORY_LEN: usize = 600;

/// Metrics registry for the respawn scheduler
#[derive(Debug)]
pub struct Metrics {
    // Respawn lifecycle
    pub respawns_started: AtomicU64,
    pub respawns_completed: AtomicU64,
    pub respawns_cancelled: AtomicU64,
    pub announcements_sent: AtomicU64,

    // Current state
    pub active_countdowns: AtomicU64,
    pub worlds_tracked: AtomicU64,
    pub templates_loaded: AtomicU64,

    // Tick timing (microseconds)
    pub tick_count: AtomicU64,
    pub tick_time_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,

    start_time: Instant,
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            respawns_started: AtomicU64::new(0),
            respawns_completed: AtomicU64::new(0),
            respawns_cancelled: AtomicU64::new(0),
            announcements_sent: AtomicU64::new(0),
            active_countdowns: AtomicU64::new(0),
            worlds_tracked: AtomicU64::new(0),
            templates_loaded: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY_LEN)),
        }
    }

    /// Record how long one registry tick took
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY_LEN {
            history.pop_front();
        }

        let max = history.iter().copied().max().unwrap_or(0);
        self.tick_time_max_us.store(max, Ordering::Relaxed);
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("arena_respawn_started_total", "Respawn countdowns started", "counter",
            self.respawns_started.load(Ordering::Relaxed));
        metric!("arena_respawn_completed_total", "Countdowns that spawned a boss", "counter",
            self.respawns_completed.load(Ordering::Relaxed));
        metric!("arena_respawn_cancelled_total", "Countdowns stopped before zero", "counter",
            self.respawns_cancelled.load(Ordering::Relaxed));
        metric!("arena_respawn_announcements_total", "Remaining-time announcements sent", "counter",
            self.announcements_sent.load(Ordering::Relaxed));

        metric!("arena_respawn_active_countdowns", "Worlds currently counting down", "gauge",
            self.active_countdowns.load(Ordering::Relaxed));
        metric!("arena_respawn_worlds_tracked", "Worlds with respawn state", "gauge",
            self.worlds_tracked.load(Ordering::Relaxed));
        metric!("arena_respawn_templates_loaded", "Boss templates loaded", "gauge",
            self.templates_loaded.load(Ordering::Relaxed));

        metric!("arena_respawn_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));
        metric!("arena_respawn_tick_time_microseconds", "Last tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("arena_respawn_tick_time_max_microseconds", "Maximum recent tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("arena_respawn_uptime_seconds", "Uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Generate JSON format metrics (alternative for direct API access)
    pub fn to_json(&self) -> String {
        format!(r#"{{
  "respawns": {{
    "started": {},
    "completed": {},
    "cancelled": {},
    "announcements": {}
  }},
  "state": {{
    "active_countdowns": {},
    "worlds_tracked": {},
    "templates_loaded": {}
  }},
  "performance": {{
    "tick_count": {},
    "tick_time_us": {},
    "tick_time_max_us": {},
    "uptime_seconds": {}
  }}
}}"#,
            self.respawns_started.load(Ordering::Relaxed),
            self.respawns_completed.load(Ordering::Relaxed),
            self.respawns_cancelled.load(Ordering::Relaxed),
            self.announcements_sent.load(Ordering::Relaxed),
            self.active_countdowns.load(Ordering::Relaxed),
            self.worlds_tracked.load(Ordering::Relaxed),
            self.templates_loaded.load(Ordering::Relaxed),
            self.tick_count.load(Ordering::Relaxed),
            self.tick_time_us.load(Ordering::Relaxed),
            self.tick_time_max_us.load(Ordering::Relaxed),
            self.uptime_seconds(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the metrics HTTP server
pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Metrics server listening on http://{}/metrics", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);
                    let response = respond(&metrics, &request);

                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}

/// Build the HTTP response for a raw request
fn respond(metrics: &Metrics, request: &str) -> String {
    let (content_type, body) = if request.starts_with("GET /metrics/json") {
        ("application/json", metrics.to_json())
    } else if request.starts_with("GET /metrics") {
        ("text/plain; version=0.0.4", metrics.to_prometheus())
    } else if request.starts_with("GET /health") || request.starts_with("GET / ") {
        ("text/plain", "OK".to_string())
    } else {
        return "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string();
    };

    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        content_type,
        body.len(),
        body
    )
}
