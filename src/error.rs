//! Failure classification for the job queue's retry policy.
//!
//! Mirrors the teacher's failure classification pattern (a closed enum with
//! a `classify`/`is_transient`-style helper matched against a fixed variant
//! subset), but classifies the capture pipeline's own [`OutcomeResult`]
//! directly rather than routing through a generic crate-wide error type,
//! since that is the only signal `worker::run_capture_job` has to decide
//! between a rate-discipline wait and the generic backoff schedule.

use crate::store::OutcomeResult;

/// Buckets a capture outcome into a retry-policy class the job queue
/// consults when scheduling a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A site-side defense tripped (rate limit, captcha, outright block).
    /// The domain's own rate discipline already knows more about safe
    /// timing here than a generic backoff schedule does.
    PolicyBlock,
    /// Everything else: network errors, timeouts, an empty response body.
    Transient,
}

impl FailureKind {
    #[must_use]
    pub fn classify(result: OutcomeResult) -> Self {
        match result {
            OutcomeResult::Blocked | OutcomeResult::Captcha | OutcomeResult::RateLimited => {
                FailureKind::PolicyBlock
            }
            OutcomeResult::Ok | OutcomeResult::Timeout | OutcomeResult::Empty | OutcomeResult::Error => {
                FailureKind::Transient
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defenses_classify_as_policy_block() {
        assert_eq!(FailureKind::classify(OutcomeResult::Blocked), FailureKind::PolicyBlock);
        assert_eq!(FailureKind::classify(OutcomeResult::Captcha), FailureKind::PolicyBlock);
        assert_eq!(FailureKind::classify(OutcomeResult::RateLimited), FailureKind::PolicyBlock);
    }

    #[test]
    fn non_policy_failures_classify_as_transient() {
        assert_eq!(FailureKind::classify(OutcomeResult::Timeout), FailureKind::Transient);
        assert_eq!(FailureKind::classify(OutcomeResult::Empty), FailureKind::Transient);
        assert_eq!(FailureKind::classify(OutcomeResult::Error), FailureKind::Transient);
    }
}
