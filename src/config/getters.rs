//! Getter methods for `AppConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::AppConfig;

impl AppConfig {
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    #[must_use]
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    #[must_use]
    pub fn worker_pool_size(&self) -> usize {
        self.worker_pool_size
    }

    #[must_use]
    pub fn default_lease(&self) -> Duration {
        Duration::from_secs(self.default_lease_seconds)
    }

    #[must_use]
    pub fn retry_base(&self) -> Duration {
        Duration::from_secs(self.retry_base_seconds)
    }

    #[must_use]
    pub fn retry_cap(&self) -> Duration {
        Duration::from_secs(self.retry_cap_seconds)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    #[must_use]
    pub fn behavior_timeout(&self) -> Duration {
        Duration::from_millis(self.behavior_timeout_ms)
    }

    #[must_use]
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }

    #[must_use]
    pub fn min_content_length(&self) -> usize {
        self.min_content_length
    }

    #[must_use]
    pub fn exploration_threshold(&self) -> u32 {
        self.exploration_threshold
    }

    #[must_use]
    pub fn exploration_bonus(&self) -> f64 {
        self.exploration_bonus
    }

    #[must_use]
    pub fn decay_half_life_days(&self) -> f64 {
        self.decay_half_life_days
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Directory a specific artifact fingerprint should live under.
    #[must_use]
    pub fn fingerprint_dir(&self, fingerprint: &str) -> PathBuf {
        self.archive_dir.join(fingerprint)
    }
}
