//! Run-level alert policy
//!
//! A target is down iff its live probe for the current run failed;
//! historical aggregation never feeds the verdict.

use crate::probe::{ProbeOutcome, Status};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exit code for operational failures (bad config, store errors)
pub const EXIT_OPERATIONAL_ERROR: i32 = 2;

/// Run-level health classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Healthy,
    Unhealthy,
}

impl Verdict {
    /// Exit code communicated to external schedulers/alerting
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Healthy => 0,
            Verdict::Unhealthy => 1,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Healthy => write!(f, "healthy"),
            Verdict::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Verdict plus the keys that are down, for notification consumers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunVerdict {
    pub verdict: Verdict,
    pub down: Vec<String>,
}

/// Classify a run from its live outcomes.
///
/// The down set is exactly the failed keys, in outcome (registry) order.
pub fn evaluate(outcomes: &[ProbeOutcome]) -> RunVerdict {
    let down: Vec<String> = outcomes
        .iter()
        .filter(|o| o.status == Status::Failed)
        .map(|o| o.target_key.clone())
        .collect();

    let verdict = if down.is_empty() {
        Verdict::Healthy
    } else {
        Verdict::Unhealthy
    };

    RunVerdict { verdict, down }
}
