//! Seed an unseen domain's initial arm from similar domains, or fall back to
//! the globally best-performing configuration.

use crate::store::{Store, StoreResult};
use crate::utils::{COLD_START_CONFIDENCE_THRESHOLD, COLD_START_NEIGHBOR_LIMIT};

/// Resolve a starting configuration for a domain with no recorded outcomes.
///
/// 1. Look at up to [`COLD_START_NEIGHBOR_LIMIT`] similar domains, highest
///    similarity first; adopt the first one whose confidence meets
///    [`COLD_START_CONFIDENCE_THRESHOLD`].
/// 2. Otherwise, fall back to the configuration with the highest overall
///    success rate across all domains.
pub async fn resolve(store: &Store, domain: &str) -> StoreResult<Option<String>> {
    let neighbors = store
        .similar_domains_with_config(domain, COLD_START_NEIGHBOR_LIMIT)
        .await?;

    for (_similarity, config_id, confidence) in &neighbors {
        if *confidence >= COLD_START_CONFIDENCE_THRESHOLD {
            return Ok(Some(config_id.clone()));
        }
    }

    store.global_best_configuration().await
}
