//! Minimum-interval gate for upstream fetches

use crate::core::error::FetchError;
use std::time::{Duration, Instant};

pub const DEFAULT_MIN_INTERVAL_MS: u64 = 15_000;

/// Explicit throttle state owned by the rate service. Every trigger source
/// (one-shot run, watch timer, manual refresh) funnels through [`check`],
/// so no caller can bypass the minimum-interval contract.
///
/// This is a rate limit, not a cache: an admitted call always performs a
/// fresh fetch.
///
/// [`check`]: FetchThrottle::check
#[derive(Debug)]
pub struct FetchThrottle {
    min_interval: Duration,
    last_attempt: Option<Instant>,
}

impl FetchThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_attempt: None,
        }
    }

    /// Admits the call or reports the remaining wait in whole seconds,
    /// rounded up so "wait 0s" can never be emitted while still throttled.
    pub fn check(&self, now: Instant) -> Result<(), FetchError> {
        let Some(last) = self.last_attempt else {
            return Ok(());
        };

        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.min_interval {
            return Ok(());
        }

        let remaining_ms = (self.min_interval - elapsed).as_millis() as u64;
        Err(FetchError::Throttled {
            wait_secs: remaining_ms.div_ceil(1000),
        })
    }

    /// Records an admitted attempt. Called as soon as the gate opens, before
    /// the fetch resolves: a failing fetch must not re-open the gate early.
    pub fn mark(&mut self, now: Instant) {
        self.last_attempt = Some(now);
    }
}

impl Default for FetchThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_MIN_INTERVAL_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle_with_last_attempt(elapsed: Duration) -> (FetchThrottle, Instant) {
        let now = Instant::now();
        let mut throttle = FetchThrottle::new(Duration::from_millis(15_000));
        throttle.mark(now);
        (throttle, now + elapsed)
    }

    #[test]
    fn test_first_attempt_is_allowed() {
        let throttle = FetchThrottle::default();
        assert!(throttle.check(Instant::now()).is_ok());
    }

    #[test]
    fn test_attempt_within_interval_reports_wait() {
        let (throttle, now) = throttle_with_last_attempt(Duration::from_millis(10_000));
        match throttle.check(now) {
            Err(FetchError::Throttled { wait_secs }) => assert_eq!(wait_secs, 5),
            other => panic!("expected throttled, got {other:?}"),
        }
    }

    #[test]
    fn test_attempt_after_interval_is_allowed() {
        let (throttle, now) = throttle_with_last_attempt(Duration::from_millis(16_000));
        assert!(throttle.check(now).is_ok());
    }

    #[test]
    fn test_wait_is_rounded_up() {
        // 14.9s elapsed leaves 100ms, which must still read as 1s.
        let (throttle, now) = throttle_with_last_attempt(Duration::from_millis(14_900));
        match throttle.check(now) {
            Err(FetchError::Throttled { wait_secs }) => assert_eq!(wait_secs, 1),
            other => panic!("expected throttled, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_boundary_is_allowed() {
        let (throttle, now) = throttle_with_last_attempt(Duration::from_millis(15_000));
        assert!(throttle.check(now).is_ok());
    }

    #[test]
    fn test_mark_resets_the_window() {
        let now = Instant::now();
        let mut throttle = FetchThrottle::new(Duration::from_millis(15_000));
        throttle.mark(now);
        throttle.mark(now + Duration::from_millis(20_000));
        assert!(throttle.check(now + Duration::from_millis(21_000)).is_err());
    }
}
