//! Bounded worker pool draining the `capture` queue: each worker owns one
//! in-flight job, proposing a configuration from the domain learner,
//! running the capture pipeline, and reporting the outcome back to both
//! the learner and the job queue.
//!
//! Grounded in `crawl_engine::core::crawl_pages`'s `FuturesUnordered` loop
//! bounded by a `tokio::sync::Semaphore`, replacing its in-memory queue and
//! visited-set with the durable `store::job_queue` and dropping the
//! per-domain concurrency semaphore in favor of the learner's own
//! `should_wait` rate discipline, which already serializes requests to a
//! single domain across workers through the shared `Store`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::FailureKind;
use crate::learner::Learner;
use crate::pipeline::artifacts::ArtifactKind;
use crate::pipeline::{self, CaptureRequest};
use crate::store::Store;
use crate::utils::extract_domain;

const CAPTURE_QUEUE: &str = "capture";
const IDLE_BACKOFF: Duration = Duration::from_millis(500);

/// The payload shape for a `capture` job, the only job type this worker
/// pool currently executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturePayload {
    pub url: String,
    #[serde(default)]
    pub cookies: Vec<(String, String)>,
    #[serde(default = "default_artifacts")]
    pub artifacts: Vec<String>,
    #[serde(default = "default_true")]
    pub behaviors_enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_artifacts() -> Vec<String> {
    vec!["html".to_string()]
}

fn parse_artifact_kind(name: &str) -> Option<ArtifactKind> {
    match name {
        "screenshot" => Some(ArtifactKind::Screenshot),
        "pdf" => Some(ArtifactKind::Pdf),
        "html" => Some(ArtifactKind::Html),
        "warc" => Some(ArtifactKind::Warc),
        _ => None,
    }
}

/// Spawn `app_config.worker_pool_size()` worker loops plus a background
/// stale-lease reaper, running until the returned handle is aborted.
pub fn spawn_pool(app_config: Arc<AppConfig>, store: Arc<Store>, learner: Arc<Learner>) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::new();

    {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            recover_stale_loop(store).await;
        }));
    }

    for index in 0..app_config.worker_pool_size() {
        let worker_id = format!("worker-{index}-{}", Uuid::new_v4());
        let app_config = Arc::clone(&app_config);
        let store = Arc::clone(&store);
        let learner = Arc::clone(&learner);
        handles.push(tokio::spawn(async move {
            worker_loop(worker_id, app_config, store, learner).await;
        }));
    }

    handles
}

async fn recover_stale_loop(store: Arc<Store>) {
    loop {
        match store.recover_stale().await {
            Ok(0) => {}
            Ok(count) => info!(count, "recovered stale leases"),
            Err(err) => error!(%err, "failed to recover stale leases"),
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}

async fn worker_loop(worker_id: String, app_config: Arc<AppConfig>, store: Arc<Store>, learner: Arc<Learner>) {
    loop {
        let claimed = store
            .claim(CAPTURE_QUEUE, &worker_id, app_config.default_lease().as_secs() as i64)
            .await;

        let job = match claimed {
            Ok(Some(job)) => job,
            Ok(None) => {
                tokio::time::sleep(IDLE_BACKOFF).await;
                continue;
            }
            Err(err) => {
                error!(worker = %worker_id, %err, "failed to claim job");
                tokio::time::sleep(IDLE_BACKOFF).await;
                continue;
            }
        };

        let payload: CapturePayload = match serde_json::from_value(job.payload.clone()) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(worker = %worker_id, job = %job.id, %err, "malformed capture payload");
                let _ = store
                    .fail(
                        &job.id,
                        &worker_id,
                        &format!("malformed payload: {err}"),
                        app_config.retry_base().as_secs() as i64,
                        app_config.retry_cap().as_secs() as i64,
                    )
                    .await;
                continue;
            }
        };

        run_capture_job(&worker_id, &app_config, &store, &learner, &job.id, &payload).await;
    }
}

async fn run_capture_job(
    worker_id: &str,
    app_config: &AppConfig,
    store: &Store,
    learner: &Learner,
    job_id: &str,
    payload: &CapturePayload,
) {
    let domain = match extract_domain(&payload.url) {
        Ok(domain) => domain,
        Err(err) => {
            warn!(worker = %worker_id, job = %job_id, %err, "invalid capture URL");
            let _ = store
                .fail(
                    job_id,
                    worker_id,
                    &format!("invalid url: {err}"),
                    app_config.retry_base().as_secs() as i64,
                    app_config.retry_cap().as_secs() as i64,
                )
                .await;
            return;
        }
    };

    let wait = learner.should_wait(&domain).await.unwrap_or(Duration::ZERO);
    if wait > Duration::ZERO {
        tokio::time::sleep(wait).await;
    }

    let configuration = match learner.propose(&domain).await {
        Ok(configuration) => configuration,
        Err(err) => {
            error!(worker = %worker_id, job = %job_id, %domain, %err, "learner failed to propose a configuration");
            let _ = store
                .fail(
                    job_id,
                    worker_id,
                    &format!("no configuration available: {err}"),
                    app_config.retry_base().as_secs() as i64,
                    app_config.retry_cap().as_secs() as i64,
                )
                .await;
            return;
        }
    };

    let request = CaptureRequest {
        url: payload.url.clone(),
        cookies: payload.cookies.clone(),
        artifacts: payload.artifacts.iter().filter_map(|s| parse_artifact_kind(s)).collect(),
        behaviors_enabled: payload.behaviors_enabled,
    };

    let capture = pipeline::capture(app_config, &configuration, &request).await;

    let capture = match capture {
        Ok(capture) => capture,
        Err(err) => {
            error!(worker = %worker_id, job = %job_id, %err, "pipeline orchestration failed");
            let _ = store
                .fail(
                    job_id,
                    worker_id,
                    &err.to_string(),
                    app_config.retry_base().as_secs() as i64,
                    app_config.retry_cap().as_secs() as i64,
                )
                .await;
            return;
        }
    };

    if let Err(err) = learner
        .record(
            &domain,
            &payload.url,
            &configuration.id,
            capture.result,
            capture.block_service.clone(),
            capture.status,
            Some(capture.duration_ms),
            capture.content_length,
            capture.title.clone(),
        )
        .await
    {
        warn!(worker = %worker_id, job = %job_id, %err, "failed to record outcome to the learner");
    }

    if capture.success {
        let result = serde_json::json!({
            "artifacts": capture.artifacts.iter().map(|(k, v)| (k.to_string(), v.display().to_string())).collect::<std::collections::HashMap<_, _>>(),
            "status": capture.status,
            "title": capture.title,
            "duration_ms": capture.duration_ms,
        });
        if let Err(err) = store.succeed(job_id, worker_id, result).await {
            error!(worker = %worker_id, job = %job_id, %err, "failed to mark job done");
        }
    } else {
        let error_message = capture
            .error
            .unwrap_or_else(|| format!("capture classified as {:?}", capture.result));

        let failure = if FailureKind::classify(capture.result) == FailureKind::PolicyBlock {
            let wait = learner.should_wait(&domain).await.unwrap_or(Duration::ZERO);
            store.fail_after(job_id, worker_id, &error_message, wait.as_secs() as i64).await
        } else {
            store
                .fail(
                    job_id,
                    worker_id,
                    &error_message,
                    app_config.retry_base().as_secs() as i64,
                    app_config.retry_cap().as_secs() as i64,
                )
                .await
        };

        if let Err(err) = failure {
            error!(worker = %worker_id, job = %job_id, %err, "failed to record job failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_payload_defaults_to_html_only_with_behaviors_enabled() {
        let payload: CapturePayload = serde_json::from_value(serde_json::json!({
            "url": "https://example.com",
        }))
        .unwrap();

        assert_eq!(payload.url, "https://example.com");
        assert_eq!(payload.artifacts, vec!["html".to_string()]);
        assert!(payload.behaviors_enabled);
        assert!(payload.cookies.is_empty());
    }

    #[test]
    fn capture_payload_honors_explicit_overrides() {
        let payload: CapturePayload = serde_json::from_value(serde_json::json!({
            "url": "https://example.com",
            "cookies": [["session", "abc123"]],
            "artifacts": ["screenshot", "warc"],
            "behaviors_enabled": false,
        }))
        .unwrap();

        assert_eq!(payload.cookies, vec![("session".to_string(), "abc123".to_string())]);
        assert_eq!(payload.artifacts, vec!["screenshot".to_string(), "warc".to_string()]);
        assert!(!payload.behaviors_enabled);
    }

    #[test]
    fn parse_artifact_kind_rejects_unknown_names() {
        assert_eq!(parse_artifact_kind("screenshot"), Some(ArtifactKind::Screenshot));
        assert_eq!(parse_artifact_kind("warc"), Some(ArtifactKind::Warc));
        assert_eq!(parse_artifact_kind("carrier-pigeon"), None);
    }
}
