//! Core configuration type for the engine.
//!
//! This module contains `AppConfig`, the typed surface over the options
//! listed under "Configuration surface": storage locations, worker pool
//! sizing, retry/lease tuning, timeouts, and bandit hyperparameters.
//! Loading these values from environment or file sources happens upstream;
//! `AppConfig` only validates and defaults values it is handed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database path backing the outcome store and job queue.
    pub(crate) database_path: PathBuf,

    /// Root directory under which capture artifacts are written.
    pub(crate) archive_dir: PathBuf,

    /// Number of concurrent workers draining the job queue.
    pub(crate) worker_pool_size: usize,

    /// Default lease duration granted to a worker on `claim`.
    pub(crate) default_lease_seconds: u64,

    /// Base delay for exponential retry backoff: `base * 2^(attempts-1)`.
    pub(crate) retry_base_seconds: u64,

    /// Ceiling applied to the computed retry backoff.
    pub(crate) retry_cap_seconds: u64,

    /// Attempts allowed before a job is dead-lettered.
    pub(crate) max_attempts: u32,

    /// Timeout for page navigation.
    pub(crate) navigation_timeout_ms: u64,

    /// Timeout for the behavior runner as a whole.
    pub(crate) behavior_timeout_ms: u64,

    /// Overall per-capture deadline covering every phase.
    pub(crate) overall_timeout_ms: u64,

    /// Body text below this length (after an error-ish keyword match) is
    /// classified `empty` by the response validator.
    pub(crate) min_content_length: usize,

    /// Arms with fewer than this many weighted observations receive the
    /// exploration bonus.
    pub(crate) exploration_threshold: u32,

    /// Additive nudge applied to the Thompson sample of under-explored arms.
    pub(crate) exploration_bonus: f64,

    /// Half-life, in days, of the exponential time-decay weighting applied
    /// to historical outcomes.
    pub(crate) decay_half_life_days: f64,

    /// Run the browser without a visible window. Forced `true` in release
    /// builds; only debug builds may run headed for local debugging.
    pub(crate) headless: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./national-treasure.db"),
            archive_dir: PathBuf::from("./archive"),
            worker_pool_size: 3,
            default_lease_seconds: 1800,
            retry_base_seconds: 30,
            retry_cap_seconds: 3600,
            max_attempts: 3,
            navigation_timeout_ms: 30_000,
            behavior_timeout_ms: 30_000,
            overall_timeout_ms: 120_000,
            min_content_length: 500,
            exploration_threshold: 10,
            exploration_bonus: 0.1,
            decay_half_life_days: 30.0,
            headless: true,
        }
    }
}
