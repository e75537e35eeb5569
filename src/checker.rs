//! Run orchestration
//!
//! Wires the registry, prober, scheduler, history store and alert policy
//! into one pipeline: load targets, fan probes out, join, record outcomes
//! sequentially, derive per-target uptime, classify the run.

use crate::aggregate;
use crate::alert::{self, Verdict};
use crate::config::Config;
use crate::errors::{CheckerError, Result};
use crate::probe::{self, Prober, Status};
use crate::registry;
use crate::scheduler;
use crate::store::{HistoryStore, LogRecord};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Per-target slice of a run report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetReport {
    pub key: String,
    pub url: String,
    pub status: Status,
    /// Overall uptime over the target's entire history; `None` means no data
    pub uptime_percent: Option<f64>,
}

/// Summary of one run, consumed by notification/reporting collaborators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub verdict: Verdict,
    /// Keys whose live probe failed this run, in registry order
    pub down: Vec<String>,
    /// Keys whose outcome could not be recorded; operational, not "down"
    pub store_errors: Vec<String>,
    pub targets: Vec<TargetReport>,
}

impl RunReport {
    /// Process exit code: the verdict wins, store errors surface otherwise
    pub fn exit_code(&self) -> i32 {
        if self.verdict == Verdict::Unhealthy {
            self.verdict.exit_code()
        } else if !self.store_errors.is_empty() {
            alert::EXIT_OPERATIONAL_ERROR
        } else {
            self.verdict.exit_code()
        }
    }
}

/// Availability checker orchestrating one run (or a periodic loop of runs)
pub struct UptimeChecker {
    config: Config,
    prober: Arc<Prober>,
    store: HistoryStore,
}

impl UptimeChecker {
    /// Create a checker from validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate().map_err(CheckerError::Config)?;

        let prober = Arc::new(Prober::new(
            config.connect_timeout,
            config.request_timeout,
            config.max_attempts,
            config.retry_delay,
        )?);

        let store = HistoryStore::new(config.history_dir.clone(), config.retention);

        Ok(Self {
            config,
            prober,
            store,
        })
    }

    /// Execute one full check run.
    ///
    /// The run always completes and reports per-target status; a single
    /// unreachable target never aborts it. Store failures are collected and
    /// surfaced separately from probe failures.
    pub async fn run_once(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();

        let targets = registry::load_targets(&self.config.targets_path).await?;
        if targets.is_empty() {
            warn!("Registry {} has no targets", self.config.targets_path.display());
        }

        info!("Run {} probing {} targets", run_id, targets.len());

        let outcomes = scheduler::run_probes(Arc::clone(&self.prober), &targets).await;

        // Appends are strictly sequential after the join
        let mut target_reports = Vec::with_capacity(targets.len());
        let mut store_errors = Vec::new();

        for (target, outcome) in targets.iter().zip(&outcomes) {
            let record = LogRecord {
                timestamp: outcome.timestamp,
                status: outcome.status,
            };

            if let Err(e) = self.store.append(&target.key, &record).await {
                error!("Failed to record outcome for '{}': {}", target.key, e);
                store_errors.push(target.key.clone());
            }

            let uptime_percent = match self.store.read_records(&target.key).await {
                Ok(records) => {
                    aggregate::aggregate(&records, probe::minute_now()).overall_percent
                }
                Err(e) => {
                    error!("Failed to read history for '{}': {}", target.key, e);
                    None
                }
            };

            target_reports.push(TargetReport {
                key: target.key.clone(),
                url: target.url.clone(),
                status: outcome.status,
                uptime_percent,
            });
        }

        let run_verdict = alert::evaluate(&outcomes);
        match run_verdict.verdict {
            Verdict::Healthy => info!("Run {} finished: healthy", run_id),
            Verdict::Unhealthy => warn!(
                "Run {} finished: unhealthy, down: {}",
                run_id,
                run_verdict.down.join(", ")
            ),
        }

        Ok(RunReport {
            run_id,
            started_at,
            verdict: run_verdict.verdict,
            down: run_verdict.down,
            store_errors,
            targets: target_reports,
        })
    }

    /// Run on a fixed interval until ctrl-c
    pub async fn watch(&self) -> Result<()> {
        info!(
            "Starting periodic checks every {:?}",
            self.config.check_interval
        );

        let mut ticker = tokio::time::interval(self.config.check_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!("Run failed: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down availability checker");
                    return Ok(());
                }
            }
        }
    }
}
