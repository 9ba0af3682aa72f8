//! Thompson sampling over a domain's configurations, treating each as a
//! bandit arm whose posterior is `Beta(weighted_successes + 1, weighted_failures + 1)`.

use std::collections::HashMap;

use rand::rng;
use rand_distr::{Beta, Distribution};

use crate::store::outcome_store::ArmStats;

/// An arm's drawn sample plus the stats it was drawn from, for tie-breaking
/// and reporting.
#[derive(Debug, Clone)]
pub struct ArmChoice {
    pub config_id: String,
    pub sample: f64,
    pub stats: ArmStats,
}

/// Select the arm with the highest Thompson sample, adding an exploration
/// bonus to arms whose total weighted observations are below
/// `exploration_threshold`. Ties break on the arm with the more recent
/// success.
pub fn select(
    arms: &HashMap<String, ArmStats>,
    exploration_threshold: f64,
    exploration_bonus: f64,
) -> Option<ArmChoice> {
    let mut rng = rng();
    let mut best: Option<ArmChoice> = None;

    for (config_id, stats) in arms {
        let alpha = (stats.weighted_successes + 1.0).max(f64::MIN_POSITIVE);
        let beta_param = (stats.weighted_failures + 1.0).max(f64::MIN_POSITIVE);
        let Ok(beta) = Beta::new(alpha, beta_param) else {
            continue;
        };
        let mut sample = beta.sample(&mut rng);
        if stats.total_observations < exploration_threshold {
            sample += exploration_bonus;
        }

        let candidate = ArmChoice {
            config_id: config_id.clone(),
            sample,
            stats: *stats,
        };

        best = Some(match best {
            None => candidate,
            Some(current) => {
                if candidate.sample > current.sample
                    || (candidate.sample == current.sample
                        && candidate.stats.last_success.unwrap_or(0)
                            > current.stats.last_success.unwrap_or(0))
                {
                    candidate
                } else {
                    current
                }
            }
        });
    }

    best
}

/// Posterior mean of an arm's Beta distribution — the confidence value
/// stored against a domain's best configuration.
#[must_use]
pub fn posterior_mean(stats: &ArmStats) -> f64 {
    let alpha = stats.weighted_successes + 1.0;
    let beta = stats.weighted_failures + 1.0;
    alpha / (alpha + beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(successes: f64, failures: f64) -> ArmStats {
        ArmStats {
            weighted_successes: successes,
            weighted_failures: failures,
            last_success: None,
            total_observations: successes + failures,
        }
    }

    #[test]
    fn select_returns_none_for_empty_arms() {
        assert!(select(&HashMap::new(), 10.0, 0.1).is_none());
    }

    #[test]
    fn posterior_mean_favors_more_successes() {
        let strong = posterior_mean(&stats(90.0, 10.0));
        let weak = posterior_mean(&stats(10.0, 90.0));
        assert!(strong > weak);
    }

    #[test]
    fn select_picks_an_existing_arm() {
        let mut arms = HashMap::new();
        arms.insert("a".to_string(), stats(5.0, 1.0));
        arms.insert("b".to_string(), stats(1.0, 5.0));
        let choice = select(&arms, 10.0, 0.1).expect("an arm should be chosen");
        assert!(arms.contains_key(&choice.config_id));
    }
}
