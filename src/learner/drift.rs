//! Periodic per-domain drift detection: compares the success rate of the
//! most recent outcomes against the historical rate, and flags new block
//! attributions that weren't present historically.
//!
//! Drift signals are surfaced to callers; the learner itself only reacts by
//! temporarily widening the exploration bonus for under-sampled arms — it
//! never acts on drift autonomously beyond that.

use crate::store::{OutcomeResult, Store, StoreResult};
use crate::utils::{DRIFT_HISTORICAL_FLOOR, DRIFT_RECENT_CEILING, DRIFT_RECENT_WINDOW};

#[derive(Debug, Clone, Default)]
pub struct DriftSignal {
    pub drift: bool,
    pub new_block_services: Vec<String>,
}

impl DriftSignal {
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        !self.drift && self.new_block_services.is_empty()
    }
}

/// Check `domain` for drift: recent success rate collapsing relative to
/// historical, or a block attribution appearing that wasn't seen before.
pub async fn check(store: &Store, domain: &str) -> StoreResult<DriftSignal> {
    let recent = store
        .recent_outcomes(domain, DRIFT_RECENT_WINDOW)
        .await?;
    let historical_rate = store
        .historical_success_rate(domain, DRIFT_RECENT_WINDOW)
        .await?;

    let drift = match historical_rate {
        Some(historical) if historical >= DRIFT_HISTORICAL_FLOOR && !recent.is_empty() => {
            let recent_successes = recent.iter().filter(|o| o.result.is_success()).count();
            let recent_rate = recent_successes as f64 / recent.len() as f64;
            recent_rate <= DRIFT_RECENT_CEILING
        }
        _ => false,
    };

    let recent_services: Vec<String> = recent
        .iter()
        .filter(|o| o.result != OutcomeResult::Ok)
        .filter_map(|o| o.block_service.clone())
        .collect();
    let historical_services = store
        .historical_block_services(domain, DRIFT_RECENT_WINDOW)
        .await?;

    let new_block_services: Vec<String> = recent_services
        .into_iter()
        .filter(|s| !historical_services.contains(s))
        .collect();

    Ok(DriftSignal {
        drift,
        new_block_services,
    })
}
