//! One-shot concurrent probe fan-out
//!
//! Every target gets its own tokio task; the fleet is small enough that no
//! worker pool cap is needed. Handles are awaited in registry order, so the
//! output order never depends on completion order.

use crate::probe::{ProbeOutcome, Prober, Status};
use crate::registry::Target;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error};

/// Probe all targets concurrently and join before returning.
///
/// The result covers exactly the input target set, in input order. A probe
/// task that fails internally is absorbed as a `Failed` outcome for its key
/// and never aborts the run.
pub async fn run_probes(prober: Arc<Prober>, targets: &[Target]) -> Vec<ProbeOutcome> {
    let mut keys = Vec::with_capacity(targets.len());
    let mut handles = Vec::with_capacity(targets.len());

    for target in targets {
        let prober = Arc::clone(&prober);
        let target = target.clone();
        keys.push(target.key.clone());
        handles.push(tokio::spawn(async move { prober.check(&target).await }));
    }

    debug!("Launched {} probe tasks", handles.len());

    let mut outcomes = Vec::with_capacity(handles.len());
    for (key, joined) in keys.into_iter().zip(join_all(handles).await) {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                error!("Probe task for '{}' failed: {}", key, e);
                outcomes.push(ProbeOutcome::new(key, Status::Failed));
            }
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_prober() -> Arc<Prober> {
        Arc::new(
            Prober::new(
                Duration::from_secs(1),
                Duration::from_secs(2),
                1,
                Duration::from_millis(10),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_mixed_fleet_outcomes_keyed_by_target() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/up"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let targets = vec![
            Target {
                key: "broken".to_string(),
                url: format!("{}/broken", server.uri()),
            },
            Target {
                key: "unreachable".to_string(),
                url: "http://127.0.0.1:1/".to_string(),
            },
            Target {
                key: "up".to_string(),
                url: format!("{}/up", server.uri()),
            },
        ];

        let outcomes = run_probes(fast_prober(), &targets).await;

        let keys: Vec<&str> = outcomes.iter().map(|o| o.target_key.as_str()).collect();
        assert_eq!(keys, vec!["broken", "unreachable", "up"]);

        assert_eq!(outcomes[0].status, Status::Failed);
        assert_eq!(outcomes[1].status, Status::Failed);
        assert_eq!(outcomes[2].status, Status::Success);
    }

    #[tokio::test]
    async fn test_empty_target_list() {
        let outcomes = run_probes(fast_prober(), &[]).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_output_order_matches_registry_order() {
        let server = MockServer::start().await;
        // Slow first target, instant second; order must still follow input
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fast"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let targets = vec![
            Target {
                key: "slow".to_string(),
                url: format!("{}/slow", server.uri()),
            },
            Target {
                key: "fast".to_string(),
                url: format!("{}/fast", server.uri()),
            },
        ];

        let outcomes = run_probes(fast_prober(), &targets).await;

        assert_eq!(outcomes[0].target_key, "slow");
        assert_eq!(outcomes[1].target_key, "fast");
        assert!(outcomes.iter().all(|o| o.status == Status::Success));
    }
}
