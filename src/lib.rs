//! Arena Respawn Library
//!
//! Schedules the timed respawn of an arena boss, independently for every
//! arena world: a countdown per world, periodic announcements of the time
//! left, and guards against overlapping respawns.
//!
//! # Features
//!
//! - `metrics` - Prometheus/JSON counters and HTTP endpoint (enabled by default)

pub mod config;
pub mod host;
pub mod respawn;
pub mod template;
pub mod util;
pub mod world;

#[cfg(feature = "metrics")]
pub mod metrics;
