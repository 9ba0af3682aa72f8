//! Domain learner: the heart of the system. For any domain, proposes a
//! configuration via Thompson sampling over the outcome store's arm
//! statistics (falling back to cold start for unseen domains), and ingests
//! the outcome of using it, updating the domain's best-known configuration
//! when a new arm's posterior dominates.

pub mod bandit;
pub mod cold_start;
pub mod drift;
pub mod rate_discipline;

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::store::outcome_store::outcome_now;
use crate::store::{Configuration, OutcomeResult, Store, StoreError};
use rate_discipline::RateDiscipline;

#[derive(Debug, Error)]
pub enum LearnerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("no configuration available for domain {0}")]
    NoConfiguration(String),
}

pub type LearnerResult<T> = Result<T, LearnerError>;

const MIN_SAMPLES_TO_DOMINATE: f64 = 10.0;

/// Handle to the learning subsystem: the durable store plus in-process rate
/// discipline state.
pub struct Learner {
    store: Store,
    rates: RateDiscipline,
    exploration_threshold: f64,
    exploration_bonus: f64,
    decay_half_life_days: f64,
}

impl Learner {
    #[must_use]
    pub fn new(
        store: Store,
        exploration_threshold: f64,
        exploration_bonus: f64,
        decay_half_life_days: f64,
    ) -> Self {
        Self {
            store,
            rates: RateDiscipline::new(),
            exploration_threshold,
            exploration_bonus,
            decay_half_life_days,
        }
    }

    /// Duration the caller must wait before requesting a configuration for
    /// `domain`. Honors the domain's learned rate-discipline parameters,
    /// falling back to permissive defaults for a domain with no history.
    pub async fn should_wait(&self, domain: &str) -> LearnerResult<Duration> {
        let (min_delay, max_per_minute) = match self.store.domain_record(domain).await? {
            Some(record) => (
                Duration::from_millis(record.min_delay_ms),
                record.max_per_minute,
            ),
            None => (Duration::ZERO, 60),
        };
        Ok(self.rates.should_wait(domain, min_delay, max_per_minute))
    }

    /// Propose a configuration for `domain`: Thompson-sample its arm stats,
    /// or cold-start from similar domains / the global best when unseen.
    pub async fn propose(&self, domain: &str) -> LearnerResult<Configuration> {
        let arms = self.store.arm_stats(domain, self.decay_half_life_days).await?;

        let config_id = if arms.is_empty() {
            cold_start::resolve(&self.store, domain)
                .await?
                .ok_or_else(|| LearnerError::NoConfiguration(domain.to_string()))?
        } else {
            bandit::select(&arms, self.exploration_threshold, self.exploration_bonus)
                .map(|choice| choice.config_id)
                .ok_or_else(|| LearnerError::NoConfiguration(domain.to_string()))?
        };

        self.store
            .get_configuration(&config_id)
            .await?
            .ok_or_else(|| LearnerError::NoConfiguration(domain.to_string()))
    }

    /// Record the outcome of a capture attempt, updating the domain's
    /// best-known configuration if the arm just used now dominates it.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        domain: &str,
        url: &str,
        config_id: &str,
        result: OutcomeResult,
        block_service: Option<String>,
        http_status: Option<u16>,
        response_ms: Option<u64>,
        content_length: Option<u64>,
        page_title: Option<String>,
    ) -> LearnerResult<()> {
        let outcome = outcome_now(
            uuid::Uuid::new_v4().to_string(),
            domain.to_string(),
            url.to_string(),
            config_id.to_string(),
            result,
            block_service,
            http_status,
            response_ms,
            content_length,
            page_title,
        );
        self.store.record_outcome(&outcome).await?;

        let arms = self.store.arm_stats(domain, self.decay_half_life_days).await?;
        if let Some(stats) = arms.get(config_id) {
            let candidate_mean = bandit::posterior_mean(stats);
            let candidate_samples = stats.weighted_successes + stats.weighted_failures;

            let current_best = self.store.domain_record(domain).await?;
            let should_update = match current_best.as_ref().and_then(|d| d.best_config_id.as_deref()) {
                // No best assigned yet: promote immediately so `confidence`
                // reflects the first outcome's Beta(2, 1) posterior mean
                // rather than staying at zero until ten samples accumulate.
                None => true,
                Some(current_id) if current_id == config_id => true,
                Some(current_id) => {
                    let current_mean = arms
                        .get(current_id)
                        .map(bandit::posterior_mean)
                        .unwrap_or(0.0);
                    candidate_samples >= MIN_SAMPLES_TO_DOMINATE && candidate_mean > current_mean
                }
            };

            if should_update {
                debug!(domain, config_id, confidence = candidate_mean, "updating domain best configuration");
                self.store
                    .update_domain_best(domain, config_id, candidate_mean)
                    .await?;
            }
        }

        Ok(())
    }

    /// Check `domain` for drift, widening future exploration implicitly by
    /// the caller re-running `propose` more often when this signal fires.
    pub async fn check_drift(&self, domain: &str) -> LearnerResult<drift::DriftSignal> {
        let signal = drift::check(&self.store, domain).await?;
        if !signal.is_quiet() {
            info!(domain, drift = signal.drift, new_blocks = ?signal.new_block_services, "drift detected");
        }
        Ok(signal)
    }

    /// Ensure the built-in configuration catalog exists, for a fresh store.
    pub async fn seed_default_catalog(&self) -> LearnerResult<()> {
        for config in crate::store::configurations::default_catalog() {
            self.store
                .ensure_configuration(
                    &config.id,
                    &config.name,
                    config.headless_kind,
                    config.viewport_w,
                    config.viewport_h,
                    &config.user_agent,
                    config.stealth,
                    config.wait_strategy,
                    config.timeout_ms,
                )
                .await?;
        }
        Ok(())
    }
}
