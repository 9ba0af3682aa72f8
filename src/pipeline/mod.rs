//! Capture pipeline: one-shot page capture producing a typed
//! [`CaptureResult`], composing a browser session, the response validator,
//! the behavior runner, and atomic artifact emission.
//!
//! Phase ordering is grounded in `crawl_engine::core::process_single_page`
//! (session → navigate → extract → validate → behaviors), adapted from a
//! reused pooled page to a scoped per-capture session and generalized from
//! one output kind to the artifact-kind map of the data model.

pub mod artifacts;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetCookiesParams};
use thiserror::Error;
use tracing::{info, warn};

use crate::behaviors;
use crate::config::AppConfig;
use crate::session::{Session, SessionError};
use crate::store::{Configuration, OutcomeResult};
use crate::validator::{self, ValidationInput};
use artifacts::ArtifactKind;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture exceeded overall deadline")]
    Timeout,
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// One capture request: a target URL under a proposed configuration.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub url: String,
    pub cookies: Vec<(String, String)>,
    pub artifacts: Vec<ArtifactKind>,
    pub behaviors_enabled: bool,
}

/// Outcome of one capture attempt. Always produced, even on failure — the
/// pipeline never bubbles an error past this boundary; it reports one.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub success: bool,
    pub result: OutcomeResult,
    pub block_service: Option<String>,
    pub artifacts: HashMap<&'static str, PathBuf>,
    pub title: Option<String>,
    pub status: Option<u16>,
    pub content_length: Option<u64>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl CaptureResult {
    fn failed(result: OutcomeResult, error: impl Into<String>, started: Instant) -> Self {
        Self {
            success: false,
            result,
            block_service: None,
            artifacts: HashMap::new(),
            title: None,
            status: None,
            content_length: None,
            duration_ms: started.elapsed().as_millis() as u64,
            error: Some(error.into()),
        }
    }
}

/// Run one capture end to end: acquire a session, navigate, validate,
/// optionally run behaviors, and emit the requested artifacts. Never
/// returns `Err` for capture-domain failures — those become a `CaptureResult`
/// with `success: false`; `Err` is reserved for setup failures the caller
/// cannot recover a meaningful result from (none currently reachable, kept
/// for the orchestration seam).
pub async fn capture(
    app_config: &AppConfig,
    configuration: &Configuration,
    request: &CaptureRequest,
) -> PipelineResult<CaptureResult> {
    let started = Instant::now();
    let outcome = tokio::time::timeout(
        app_config.overall_timeout(),
        run_phases(app_config, configuration, request, started),
    )
    .await;

    Ok(match outcome {
        Ok(result) => result,
        Err(_) => {
            warn!(url = %request.url, "capture exceeded overall deadline");
            CaptureResult::failed(OutcomeResult::Timeout, "overall deadline exceeded", started)
        }
    })
}

async fn run_phases(
    app_config: &AppConfig,
    configuration: &Configuration,
    request: &CaptureRequest,
    started: Instant,
) -> CaptureResult {
    let mut session = match Session::acquire(configuration, app_config.headless()).await {
        Ok(session) => session,
        Err(err) => return CaptureResult::failed(OutcomeResult::Error, err.to_string(), started),
    };

    let page = match session.open_page().await {
        Ok(page) => page,
        Err(err) => {
            let _ = session.close().await;
            return CaptureResult::failed(OutcomeResult::Error, err.to_string(), started);
        }
    };

    if !request.cookies.is_empty() {
        if let Err(err) = inject_cookies(&page, &request.url, &request.cookies).await {
            warn!(url = %request.url, %err, "cookie injection failed, continuing without them");
        }
    }

    let navigation = page
        .navigate(&request.url, app_config.navigation_timeout())
        .await;

    let response = match navigation {
        Ok(Some(response)) => response,
        Ok(None) => {
            page.close().await;
            let _ = session.close().await;
            return CaptureResult::failed(
                OutcomeResult::Error,
                "navigation produced no response",
                started,
            );
        }
        Err(err) => {
            page.close().await;
            let _ = session.close().await;
            let result = if matches!(err, SessionError::Timeout) {
                OutcomeResult::Timeout
            } else {
                OutcomeResult::Error
            };
            return CaptureResult::failed(result, err.to_string(), started);
        }
    };

    let title = page.title().await.unwrap_or_default();
    let body_text = page.body_text().await.unwrap_or_default();
    let cookies = page.cookies().await.unwrap_or_default();

    let headers: Vec<(String, String)> = response.headers.clone();
    let validation = validator::validate(&ValidationInput {
        status: response.status,
        title: &title,
        body_text: &body_text,
        headers: &headers,
        cookies: &cookies,
        min_content_length: app_config.min_content_length(),
    });

    if validation.result == OutcomeResult::Ok && request.behaviors_enabled {
        let report = behaviors::run_all(
            page.page(),
            app_config.behavior_timeout(),
            app_config.behavior_timeout(),
        )
        .await;
        info!(
            url = %request.url,
            effects = report.total_effects(),
            elapsed_ms = report.elapsed_ms,
            "behaviors complete"
        );
    }

    let artifact_dir = app_config.fingerprint_dir(&crate::utils::url_fingerprint(&request.url));
    let mut artifacts = HashMap::new();
    let mut artifact_error = None;
    for &kind in &request.artifacts {
        match artifacts::emit(
            kind,
            &artifact_dir,
            page.page(),
            &request.url,
            response.status,
            &headers,
        )
        .await
        {
            Ok(path) => {
                artifacts.insert(kind.filename(), path);
            }
            Err(err) => {
                warn!(url = %request.url, ?kind, %err, "artifact emission failed");
                artifact_error.get_or_insert(err.to_string());
            }
        }
    }

    page.close().await;
    if let Err(err) = session.close().await {
        warn!(url = %request.url, %err, "error closing session");
    }

    let content_length = u64::try_from(body_text.len()).ok();
    CaptureResult {
        success: validation.result == OutcomeResult::Ok && artifact_error.is_none(),
        result: validation.result,
        block_service: validation.block_service,
        artifacts,
        title: Some(title),
        status: Some(response.status),
        content_length,
        duration_ms: started.elapsed().as_millis() as u64,
        error: artifact_error,
    }
}

async fn inject_cookies(
    page: &crate::session::PageScope,
    url: &str,
    cookies: &[(String, String)],
) -> PipelineResult<()> {
    let domain = crate::utils::extract_domain(url)
        .map_err(|e| PipelineError::Artifact(format!("invalid URL for cookie injection: {e}")))?;

    let params = SetCookiesParams {
        cookies: cookies
            .iter()
            .map(|(name, value)| {
                let mut param = CookieParam::new(name.clone(), value.clone());
                param.domain = Some(domain.clone());
                param
            })
            .collect(),
    };

    page.page()
        .execute(params)
        .await
        .map_err(|e| PipelineError::Artifact(format!("set cookies failed: {e}")))?;
    Ok(())
}
