//! Type-safe builder for `AppConfig` using the typestate pattern.
//!
//! Mirrors the teacher's `CrawlConfigBuilder`: required fields progress the
//! builder through marker states so `build()` is only callable once both
//! `database_path` and `archive_dir` are set.

use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::AppConfig;

pub struct WithDatabasePath;
pub struct WithArchiveDir;
pub struct Complete;

pub struct AppConfigBuilder<State = ()> {
    pub(crate) database_path: Option<PathBuf>,
    pub(crate) archive_dir: Option<PathBuf>,
    pub(crate) worker_pool_size: usize,
    pub(crate) default_lease_seconds: u64,
    pub(crate) retry_base_seconds: u64,
    pub(crate) retry_cap_seconds: u64,
    pub(crate) max_attempts: u32,
    pub(crate) navigation_timeout_ms: u64,
    pub(crate) behavior_timeout_ms: u64,
    pub(crate) overall_timeout_ms: u64,
    pub(crate) min_content_length: usize,
    pub(crate) exploration_threshold: u32,
    pub(crate) exploration_bonus: f64,
    pub(crate) decay_half_life_days: f64,
    pub(crate) headless: bool,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for AppConfigBuilder<()> {
    fn default() -> Self {
        let defaults = AppConfig::default();
        Self {
            database_path: None,
            archive_dir: None,
            worker_pool_size: defaults.worker_pool_size,
            default_lease_seconds: defaults.default_lease_seconds,
            retry_base_seconds: defaults.retry_base_seconds,
            retry_cap_seconds: defaults.retry_cap_seconds,
            max_attempts: defaults.max_attempts,
            navigation_timeout_ms: defaults.navigation_timeout_ms,
            behavior_timeout_ms: defaults.behavior_timeout_ms,
            overall_timeout_ms: defaults.overall_timeout_ms,
            min_content_length: defaults.min_content_length,
            exploration_threshold: defaults.exploration_threshold,
            exploration_bonus: defaults.exploration_bonus,
            decay_half_life_days: defaults.decay_half_life_days,
            headless: defaults.headless,
            _phantom: PhantomData,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn builder() -> AppConfigBuilder<()> {
        AppConfigBuilder::default()
    }
}

impl AppConfigBuilder<()> {
    #[must_use]
    pub fn database_path(self, path: impl Into<PathBuf>) -> AppConfigBuilder<WithDatabasePath> {
        AppConfigBuilder {
            database_path: Some(path.into()),
            archive_dir: self.archive_dir,
            worker_pool_size: self.worker_pool_size,
            default_lease_seconds: self.default_lease_seconds,
            retry_base_seconds: self.retry_base_seconds,
            retry_cap_seconds: self.retry_cap_seconds,
            max_attempts: self.max_attempts,
            navigation_timeout_ms: self.navigation_timeout_ms,
            behavior_timeout_ms: self.behavior_timeout_ms,
            overall_timeout_ms: self.overall_timeout_ms,
            min_content_length: self.min_content_length,
            exploration_threshold: self.exploration_threshold,
            exploration_bonus: self.exploration_bonus,
            decay_half_life_days: self.decay_half_life_days,
            headless: self.headless,
            _phantom: PhantomData,
        }
    }
}

impl AppConfigBuilder<WithDatabasePath> {
    #[must_use]
    pub fn archive_dir(self, dir: impl Into<PathBuf>) -> AppConfigBuilder<WithArchiveDir> {
        AppConfigBuilder {
            database_path: self.database_path,
            archive_dir: Some(dir.into()),
            worker_pool_size: self.worker_pool_size,
            default_lease_seconds: self.default_lease_seconds,
            retry_base_seconds: self.retry_base_seconds,
            retry_cap_seconds: self.retry_cap_seconds,
            max_attempts: self.max_attempts,
            navigation_timeout_ms: self.navigation_timeout_ms,
            behavior_timeout_ms: self.behavior_timeout_ms,
            overall_timeout_ms: self.overall_timeout_ms,
            min_content_length: self.min_content_length,
            exploration_threshold: self.exploration_threshold,
            exploration_bonus: self.exploration_bonus,
            decay_half_life_days: self.decay_half_life_days,
            headless: self.headless,
            _phantom: PhantomData,
        }
    }
}

impl AppConfigBuilder<WithArchiveDir> {
    pub fn build(self) -> anyhow::Result<AppConfig> {
        let database_path = self
            .database_path
            .ok_or_else(|| anyhow::anyhow!("database_path is required"))?;
        let archive_dir = self
            .archive_dir
            .ok_or_else(|| anyhow::anyhow!("archive_dir is required"))?;

        #[cfg(not(debug_assertions))]
        let headless = if !self.headless {
            tracing::warn!(
                "Forcing headless mode in release build; headed mode is debug-only."
            );
            true
        } else {
            self.headless
        };
        #[cfg(debug_assertions)]
        let headless = self.headless;

        Ok(AppConfig {
            database_path,
            archive_dir,
            worker_pool_size: self.worker_pool_size,
            default_lease_seconds: self.default_lease_seconds,
            retry_base_seconds: self.retry_base_seconds,
            retry_cap_seconds: self.retry_cap_seconds,
            max_attempts: self.max_attempts,
            navigation_timeout_ms: self.navigation_timeout_ms,
            behavior_timeout_ms: self.behavior_timeout_ms,
            overall_timeout_ms: self.overall_timeout_ms,
            min_content_length: self.min_content_length,
            exploration_threshold: self.exploration_threshold,
            exploration_bonus: self.exploration_bonus,
            decay_half_life_days: self.decay_half_life_days,
            headless,
        })
    }
}

// Builder methods available at any state, mirroring the teacher's pattern
// of state-independent setters for options with no ordering dependency.
impl<State> AppConfigBuilder<State> {
    #[must_use]
    pub fn worker_pool_size(mut self, n: usize) -> Self {
        self.worker_pool_size = n;
        self
    }

    #[must_use]
    pub fn default_lease_seconds(mut self, secs: u64) -> Self {
        self.default_lease_seconds = secs;
        self
    }

    #[must_use]
    pub fn retry_base_seconds(mut self, secs: u64) -> Self {
        self.retry_base_seconds = secs;
        self
    }

    #[must_use]
    pub fn retry_cap_seconds(mut self, secs: u64) -> Self {
        self.retry_cap_seconds = secs;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn navigation_timeout_ms(mut self, ms: u64) -> Self {
        self.navigation_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn behavior_timeout_ms(mut self, ms: u64) -> Self {
        self.behavior_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn overall_timeout_ms(mut self, ms: u64) -> Self {
        self.overall_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn min_content_length(mut self, len: usize) -> Self {
        self.min_content_length = len;
        self
    }

    #[must_use]
    pub fn exploration_threshold(mut self, n: u32) -> Self {
        self.exploration_threshold = n;
        self
    }

    #[must_use]
    pub fn exploration_bonus(mut self, bonus: f64) -> Self {
        self.exploration_bonus = bonus;
        self
    }

    #[must_use]
    pub fn decay_half_life_days(mut self, days: f64) -> Self {
        self.decay_half_life_days = days;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}
