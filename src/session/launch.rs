//! Browser launch sequence: locate (or download) a Chrome/Chromium
//! executable, build a `BrowserConfig` from a learned [`Configuration`], and
//! spawn the CDP handler task that drives the connection.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::store::{Configuration, HeadlessKind};

/// Locate a Chrome/Chromium executable via `CHROMIUM_PATH`, common
/// installation paths, or `which`.
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
        warn!(path = %path.display(), "CHROMIUM_PATH points to a non-existent file");
    }

    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ]
    };

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(anyhow::anyhow!("no Chrome/Chromium executable found"))
}

/// Download a managed Chromium build into the system cache directory.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = std::env::temp_dir().join("national_treasure_chromium_cache");
    std::fs::create_dir_all(&cache_dir).context("failed to create browser cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("failed to build browser fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("failed to fetch browser")?;
    Ok(revision.executable_path)
}

/// Launch a browser configured from `configuration`, using `profile_dir` as
/// its isolated user-data directory. Returns the browser handle and the
/// spawned CDP event-handler task.
pub async fn launch(
    configuration: &Configuration,
    profile_dir: &Path,
    headless_override: bool,
) -> Result<(Browser, JoinHandle<()>)> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(configuration.viewport_w, configuration.viewport_h)
        .user_data_dir(profile_dir.to_path_buf())
        .chrome_executable(chrome_path)
        .arg(format!("--user-agent={}", configuration.user_agent));

    builder = if headless_override {
        match configuration.headless_kind {
            HeadlessKind::Visible => builder.with_head(),
            // The new (`--headless=new`) protocol is the only one
            // `chrome-headless-shell` speaks, so it shares `New` with the
            // plain new-headless arm; `LegacyHeadless` is kept on the old
            // protocol so the bandit can actually observe a behavioral
            // difference between the two headless arms in the catalog.
            HeadlessKind::NewHeadless | HeadlessKind::Shell => {
                builder.headless_mode(HeadlessMode::New)
            }
            HeadlessKind::LegacyHeadless => builder.headless_mode(HeadlessMode::True),
        }
    } else {
        builder.with_head()
    };

    if configuration.stealth {
        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-notifications")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
    }

    builder = builder
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage");

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

    info!(profile = %profile_dir.display(), "launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(err) = event {
                let message = err.to_string();
                // Chrome occasionally emits CDP events chromiumoxide's
                // generated types don't model; those are benign.
                if message.contains("data did not match any variant of untagged enum Message") {
                    trace!(%message, "suppressed benign CDP deserialization error");
                } else {
                    error!(%message, "browser handler error");
                }
            }
        }
    });

    Ok((browser, handler_task))
}
