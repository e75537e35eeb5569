//! Bounded-retry HTTP availability probe

use crate::errors::{CheckerError, Result};
use chrono::{NaiveDateTime, Timelike, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// HTTP status codes counted as an available service
pub const SUCCESS_CODES: &[u16] = &[200, 201, 202, 204, 301, 302, 303, 307, 308];

/// Terminal classification of one probe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
}

impl Status {
    /// Parse the on-disk status token; anything else is rejected
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "success" => Some(Status::Success),
            "failed" => Some(Status::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of probing one target during one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub target_key: String,
    pub timestamp: NaiveDateTime,
    pub status: Status,
}

impl ProbeOutcome {
    pub fn new(target_key: String, status: Status) -> Self {
        Self {
            target_key,
            timestamp: minute_now(),
            status,
        }
    }
}

/// Current UTC time truncated to minute precision
pub fn minute_now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Retrying HTTP prober sharing one client across all targets
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Prober {
    /// Create a prober; redirects are followed by the client's default policy
    pub fn new(
        connect_timeout: Duration,
        request_timeout: Duration,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(format!("uptime_checker/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CheckerError::Http)?;

        Ok(Self {
            client,
            max_attempts,
            retry_delay,
        })
    }

    /// Probe a URL with bounded retries and a fixed delay between attempts.
    ///
    /// Network errors never escape this boundary; after exhausting attempts
    /// the outcome is `Failed`.
    pub async fn probe(&self, url: &str) -> Status {
        let mut attempt = 0;

        while attempt < self.max_attempts {
            attempt += 1;
            let code = self.attempt(url).await;

            if SUCCESS_CODES.contains(&code) {
                debug!("Probe of {} succeeded with {} (attempt {})", url, code, attempt);
                return Status::Success;
            }

            if attempt < self.max_attempts {
                warn!(
                    "Probe of {} returned {:03} (attempt {}), retrying in {:?}",
                    url, code, attempt, self.retry_delay
                );
                sleep(self.retry_delay).await;
            }
        }

        warn!("Probe of {} failed after {} attempts", url, self.max_attempts);
        Status::Failed
    }

    /// Probe one target and stamp the outcome
    pub async fn check(&self, target: &crate::registry::Target) -> ProbeOutcome {
        let status = self.probe(&target.url).await;
        ProbeOutcome::new(target.key.clone(), status)
    }

    /// Single attempt; transport errors map to the sentinel code 000
    async fn attempt(&self, url: &str) -> u16 {
        match self.client.get(url).send().await {
            Ok(response) => response.status().as_u16(),
            Err(e) => {
                debug!("Transport error for {}: {}", url, e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_prober(max_attempts: u32) -> Prober {
        Prober::new(
            Duration::from_secs(1),
            Duration::from_secs(2),
            max_attempts,
            Duration::from_millis(10),
        )
        .unwrap()
    }

    #[test]
    fn test_status_tokens_round_trip() {
        assert_eq!(Status::from_token("success"), Some(Status::Success));
        assert_eq!(Status::from_token("failed"), Some(Status::Failed));
        assert_eq!(Status::from_token("SUCCESS"), None);
        assert_eq!(Status::from_token("unknown"), None);
        assert_eq!(Status::Success.to_string(), "success");
        assert_eq!(Status::Failed.to_string(), "failed");
    }

    #[test]
    fn test_minute_now_has_minute_precision() {
        let now = minute_now();
        assert_eq!(now.second(), 0);
        assert_eq!(now.nanosecond(), 0);
    }

    #[tokio::test]
    async fn test_probe_succeeds_on_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let prober = test_prober(3);
        let status = prober.probe(&format!("{}/health", server.uri())).await;

        assert_eq!(status, Status::Success);
    }

    #[tokio::test]
    async fn test_probe_accepts_204() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let prober = test_prober(3);
        assert_eq!(prober.probe(&server.uri()).await, Status::Success);
    }

    #[tokio::test]
    async fn test_probe_exhausts_attempts_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let prober = test_prober(3);
        let status = prober.probe(&server.uri()).await;

        assert_eq!(status, Status::Failed);
    }

    #[tokio::test]
    async fn test_probe_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let prober = test_prober(3);
        let status = prober.probe(&server.uri()).await;

        assert_eq!(status, Status::Success);
    }

    #[tokio::test]
    async fn test_probe_absorbs_transport_errors() {
        // Nothing listens on this port; connection refused on every attempt
        let prober = test_prober(2);
        let status = prober.probe("http://127.0.0.1:1/").await;

        assert_eq!(status, Status::Failed);
    }

    #[tokio::test]
    async fn test_probe_rejects_unlisted_status_codes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(418))
            .expect(1)
            .mount(&server)
            .await;

        let prober = test_prober(1);
        assert_eq!(prober.probe(&server.uri()).await, Status::Failed);
    }
}
