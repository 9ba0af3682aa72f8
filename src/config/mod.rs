//! Configuration surface for the engine.
//!
//! Provides `AppConfig` and its type-safe builder. Values here are the ones
//! listed under the configuration surface: storage locations, worker pool
//! sizing, retry/lease tuning, timeouts, and bandit hyperparameters.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::{AppConfigBuilder, Complete, WithArchiveDir, WithDatabasePath};
pub use types::AppConfig;
