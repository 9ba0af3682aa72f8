//! Scoped browser session acquisition and release.
//!
//! Sessions are not shared across concurrent jobs: each capture acquires its
//! own browser, configured by the learner's chosen [`Configuration`], and
//! releases it — closing every page, the browser, and its CDP handler task —
//! when the capture finishes. Grounded in `browser_pool::PooledBrowserGuard`
//! (RAII release on drop) and `browser_setup::launch_browser` (executable
//! discovery, flag-parameterized config, spawned handler task), adapted from
//! a persistent pool into a per-job scope, since sessions here are never
//! reused across jobs.

pub mod launch;
pub mod profile;
pub mod stealth;

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{EnableParams, EventResponseReceived};
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::store::Configuration;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to acquire browser: {0}")]
    Acquire(#[from] anyhow::Error),

    #[error("navigation error: {0}")]
    Navigate(String),

    #[error("navigation timed out")]
    Timeout,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Metadata captured from the final main-frame response of a navigation.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

/// A scoped browser instance configured for one capture attempt.
pub struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile: profile::Profile,
}

impl Session {
    /// Acquire a browser configured from `configuration`. `headless`
    /// overrides the configuration's headless kind only when `false`
    /// (debug-mode visible browsers), matching the builder's own
    /// debug/release split.
    pub async fn acquire(configuration: &Configuration, headless: bool) -> SessionResult<Self> {
        let profile = profile::create_unique_profile()?;
        let (browser, handler) = launch::launch(configuration, profile.path(), headless).await?;
        Ok(Self {
            browser,
            handler,
            _profile: profile,
        })
    }

    /// Open a new page scope. The returned scope must be closed explicitly
    /// via [`PageScope::close`] before the session itself is released, so
    /// that a page never outlives the browser that owns it.
    pub async fn open_page(&mut self) -> SessionResult<PageScope> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Navigate(e.to_string()))?;
        Ok(PageScope { page })
    }

    /// Close every page, the browser, and abort its CDP handler task.
    pub async fn close(mut self) -> SessionResult<()> {
        if let Err(err) = self.browser.close().await {
            tracing::warn!(%err, "error closing browser");
        }
        self.handler.abort();
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Best-effort cleanup for paths that didn't call `close()` (an error
        // return, a cancelled future). The handler task is aborted
        // synchronously; the browser process is reaped when its stdio pipes
        // close, since `Browser::close` cannot be awaited here.
        self.handler.abort();
    }
}

/// A single page scoped to one navigation/capture.
pub struct PageScope {
    page: Page,
}

impl PageScope {
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate to `url`, honoring `timeout` for the whole operation, and
    /// return the final response's status and headers. A navigation that
    /// completes without ever producing a response (rare) returns
    /// `Ok(None)`, which the capture pipeline treats as an `error` outcome.
    pub async fn navigate(
        &self,
        url: &str,
        timeout: Duration,
    ) -> SessionResult<Option<ResponseMeta>> {
        let captured: std::sync::Arc<Mutex<Option<ResponseMeta>>> =
            std::sync::Arc::new(Mutex::new(None));

        let _ = self.page.execute(EnableParams::default()).await;

        let listener = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| SessionError::Navigate(e.to_string()));

        let watch_task = listener.ok().map(|mut events| {
            let captured = captured.clone();
            tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let response = &event.response;
                    let headers = serde_json::to_value(&response.headers)
                        .ok()
                        .and_then(|v| v.as_object().cloned())
                        .map(|map| {
                            map.iter()
                                .map(|(k, v)| {
                                    (k.to_lowercase(), v.as_str().unwrap_or_default().to_string())
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    let mut guard = captured.lock().await;
                    *guard = Some(ResponseMeta {
                        status: response.status as u16,
                        headers,
                    });
                }
            })
        });

        let result = tokio::time::timeout(timeout, async {
            self.page
                .goto(url)
                .await
                .map_err(|e| SessionError::Navigate(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| SessionError::Navigate(e.to_string()))
        })
        .await;

        if let Some(task) = watch_task {
            task.abort();
        }

        match result {
            Ok(Ok(_)) => Ok(captured.lock().await.clone()),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(SessionError::Timeout),
        }
    }

    /// The page's current title.
    pub async fn title(&self) -> SessionResult<String> {
        let value = self
            .page
            .evaluate("document.title")
            .await
            .map_err(|e| SessionError::Navigate(e.to_string()))?;
        Ok(value
            .into_value::<String>()
            .unwrap_or_default())
    }

    /// The page's rendered body text, as `document.body.innerText` sees it.
    pub async fn body_text(&self) -> SessionResult<String> {
        let value = self
            .page
            .evaluate("document.body ? document.body.innerText : ''")
            .await
            .map_err(|e| SessionError::Navigate(e.to_string()))?;
        Ok(value.into_value::<String>().unwrap_or_default())
    }

    /// Cookies visible to the page, formatted as `name=value` strings.
    pub async fn cookies(&self) -> SessionResult<Vec<String>> {
        let value = self
            .page
            .evaluate("document.cookie")
            .await
            .map_err(|e| SessionError::Navigate(e.to_string()))?;
        let raw = value.into_value::<String>().unwrap_or_default();
        Ok(raw
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Close this page. Swallows close errors (the page may already have
    /// navigated away or crashed); the browser's own close will clean up
    /// any page left dangling.
    pub async fn close(self) {
        if let Err(err) = self.page.close().await {
            tracing::debug!(%err, "error closing page scope");
        }
    }
}
