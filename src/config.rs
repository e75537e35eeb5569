//! Configuration management for the availability checker

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the key=url targets file
    pub targets_path: PathBuf,

    /// Directory holding one history file per target
    pub history_dir: PathBuf,

    /// Maximum probe attempts per target per run
    pub max_attempts: u32,

    /// Fixed delay between failed probe attempts
    pub retry_delay: Duration,

    /// Connection-establishment timeout per attempt
    pub connect_timeout: Duration,

    /// Total request timeout per attempt
    pub request_timeout: Duration,

    /// Maximum records kept per history file
    pub retention: usize,

    /// Interval between runs; zero means a single run
    pub check_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets_path: PathBuf::from("urls.cfg"),
            history_dir: PathBuf::from("logs"),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            retention: 2000,
            check_interval: Duration::ZERO,
        }
    }
}

impl Config {
    /// Load tuning knobs from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(attempts) = env::var("MAX_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                config.max_attempts = n;
            }
        }

        if let Ok(delay) = env::var("RETRY_DELAY_SECONDS") {
            if let Ok(seconds) = delay.parse::<u64>() {
                config.retry_delay = Duration::from_secs(seconds);
            }
        }

        if let Ok(timeout) = env::var("CONNECT_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.connect_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.request_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(retention) = env::var("RETENTION") {
            if let Ok(n) = retention.parse() {
                config.retention = n;
            }
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.targets_path.as_os_str().is_empty() {
            return Err("targets_path cannot be empty".to_string());
        }

        if self.history_dir.as_os_str().is_empty() {
            return Err("history_dir cannot be empty".to_string());
        }

        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }

        if self.retention == 0 {
            return Err("retention must be greater than 0".to_string());
        }

        Ok(())
    }
}
