//! Multi-service availability checker library
//!
//! This library provides components for probing named HTTP endpoints with
//! bounded retries, recording per-service outcome history with rolling
//! retention, and deriving a rolling uptime summary from that history.

pub mod aggregate;
pub mod alert;
pub mod checker;
pub mod config;
pub mod errors;
pub mod probe;
pub mod registry;
pub mod scheduler;
pub mod store;

pub use checker::{RunReport, TargetReport, UptimeChecker};
pub use config::Config;
pub use errors::{CheckerError, Result};
pub use probe::{ProbeOutcome, Prober, Status};
pub use registry::Target;
