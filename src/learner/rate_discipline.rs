//! Per-domain rate discipline: a learned minimum inter-request delay plus a
//! learned max-per-minute cap, generalized from
//! `crawl_engine::rate_limiter::CrawlRateLimiter`'s fixed-RPS token bucket
//! into parameters the domain learner updates from observed outcomes.
//!
//! The teacher's bucket packs `(tokens, last_refill_nanos)` into a single
//! `AtomicU128` CAS loop, which requires the unstable `integer_atomics`
//! feature on most targets. That instability buys lock-freedom this system
//! doesn't need at per-domain granularity, so each domain's bucket state
//! here is a small `std::sync::Mutex`-guarded struct instead, sharded across
//! domains by the same `DashMap` the teacher uses for its domain cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;

const TOKEN_SCALE: u64 = 1000;
const RATE_SCALE: u64 = 1_000_000;

struct TokenState {
    tokens: u64,
    last_refill_nanos: u64,
}

struct DomainLimiter {
    state: Mutex<TokenState>,
    last_request_nanos: AtomicU64,
    rate_per_nano: u64,
    max_tokens: u64,
}

impl DomainLimiter {
    fn new(max_per_minute: u32, base_time: &Instant) -> Self {
        let max_tokens = u64::from(max_per_minute.max(1)) * TOKEN_SCALE;
        let rate_per_nano =
            (u64::from(max_per_minute.max(1)) * TOKEN_SCALE * RATE_SCALE) / (60 * 1_000_000_000);
        let now_nanos = base_time.elapsed().as_nanos() as u64;
        Self {
            state: Mutex::new(TokenState {
                tokens: max_tokens,
                last_refill_nanos: now_nanos,
            }),
            last_request_nanos: AtomicU64::new(0),
            rate_per_nano: rate_per_nano.max(1),
            max_tokens,
        }
    }

    /// Wait duration before another request may proceed, or `None` if a
    /// token is available now — in which case it is consumed by this call.
    fn try_consume(&self, now_nanos: u64) -> Option<Duration> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());

        if now_nanos > state.last_refill_nanos {
            let elapsed = now_nanos - state.last_refill_nanos;
            let added = (elapsed.saturating_mul(self.rate_per_nano)) / RATE_SCALE;
            if added > 0 {
                state.tokens = state.tokens.saturating_add(added).min(self.max_tokens);
                state.last_refill_nanos = now_nanos;
            }
        }

        if state.tokens < TOKEN_SCALE {
            let needed = TOKEN_SCALE - state.tokens;
            let nanos = (needed.saturating_mul(RATE_SCALE)) / self.rate_per_nano;
            return Some(Duration::from_nanos(nanos));
        }

        state.tokens -= TOKEN_SCALE;
        None
    }
}

/// Tracks per-domain rate state across the process. Callers are required to
/// honor `should_wait`'s result before requesting a configuration for a
/// domain from the learner.
pub struct RateDiscipline {
    limiters: DashMap<String, Arc<DomainLimiter>>,
    base_time: Instant,
}

impl Default for RateDiscipline {
    fn default() -> Self {
        Self::new()
    }
}

impl RateDiscipline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            limiters: DashMap::new(),
            base_time: Instant::now(),
        }
    }

    /// How long the caller must wait before issuing another request to
    /// `domain`, given its learned `min_delay` and `max_per_minute`. Returns
    /// `Duration::ZERO` when the request may proceed immediately — in which
    /// case this call also records the request against both the min-delay
    /// floor and the rate-limit token bucket.
    pub fn should_wait(&self, domain: &str, min_delay: Duration, max_per_minute: u32) -> Duration {
        let now_nanos = self.base_time.elapsed().as_nanos() as u64;
        let limiter = Arc::clone(
            self.limiters
                .entry(domain.to_string())
                .or_insert_with(|| Arc::new(DomainLimiter::new(max_per_minute, &self.base_time)))
                .value(),
        );

        let last_request = limiter.last_request_nanos.load(Ordering::Relaxed);
        if last_request != 0 {
            let elapsed = Duration::from_nanos(now_nanos.saturating_sub(last_request));
            if elapsed < min_delay {
                return min_delay - elapsed;
            }
        }

        match limiter.try_consume(now_nanos) {
            Some(wait) => wait,
            None => {
                limiter
                    .last_request_nanos
                    .store(now_nanos, Ordering::Relaxed);
                Duration::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_immediate() {
        let rd = RateDiscipline::new();
        assert_eq!(
            rd.should_wait("example.com", Duration::from_millis(500), 60),
            Duration::ZERO
        );
    }

    #[test]
    fn immediate_second_request_must_wait_for_min_delay() {
        let rd = RateDiscipline::new();
        rd.should_wait("example.com", Duration::from_millis(500), 60);
        let wait = rd.should_wait("example.com", Duration::from_millis(500), 60);
        assert!(wait > Duration::ZERO);
    }
}
