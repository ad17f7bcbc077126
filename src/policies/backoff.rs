//! # Backoff policy for session reconnects.
//!
//! [`BackoffPolicy`] controls how the delay between reconnect attempts grows
//! while the broker keeps refusing or dropping the session.
//! It is parameterized by:
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::first`] the initial delay;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay for attempt `n` is computed as `first × factor^n`, clamped to `max`,
//! then jitter is applied. The base is derived from the attempt number only, so
//! jitter output never feeds back into later delays.
//!
//! A device defaults to a constant delay (`factor = 1.0`, no jitter). A fleet of
//! devices behind one broker may prefer growth plus [`JitterPolicy::Equal`].
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use pirvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! // Attempt 0 uses 'first' (100ms), clamped to max
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//!
//! // Attempt 1: first × factor^1 = 200ms
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//!
//! // Attempt 10: 100ms × 2^10 = 102_400ms, capped at max=10s
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Reconnect backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Initial delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap for retries.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter policy, to keep many devices from reconnecting in lockstep.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a strategy with:
    /// - `factor = 1.0` (constant delay);
    /// - `first = 100ms`;
    /// - `max = 30s`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            jitter: JitterPolicy::None,
            factor: 1.0,
        }
    }
}

impl BackoffPolicy {
    /// Fixed delay between attempts, no jitter.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay for the given attempt number (0-indexed).
    ///
    /// The base delay is `first × factor^attempt`, clamped to [`BackoffPolicy::max`],
    /// then jittered.
    ///
    /// # Notes
    /// - If `factor` is less than 1.0, delays decrease with higher attempts (not typical).
    /// - If `factor` equals 1.0, delay remains constant at `first` (up to `max`).
    /// - If `factor` is greater than 1.0, delays grow exponentially up to `max`.
    pub fn next(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let clamped_exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };

        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn growing(jitter: JitterPolicy) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_secs(1),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter,
        }
    }

    #[test]
    fn constant_policy_never_moves() {
        let policy = BackoffPolicy::constant(Duration::from_secs(2));
        for attempt in [0, 1, 7, 1_000, u32::MAX] {
            assert_eq!(policy.next(attempt), Duration::from_secs(2));
        }
    }

    #[test]
    fn growth_doubles_until_cap() {
        let policy = growing(JitterPolicy::None);
        let delays: Vec<u64> = (0..7).map(|a| policy.next(a).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30]);
    }

    #[test]
    fn first_above_max_is_capped() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(60),
            ..growing(JitterPolicy::None)
        };
        assert_eq!(policy.next(0), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_within_base() {
        for jitter in [JitterPolicy::Full, JitterPolicy::Equal] {
            let policy = growing(jitter);
            for attempt in 0..12 {
                let base = growing(JitterPolicy::None).next(attempt);
                let delay = policy.next(attempt);
                assert!(delay <= base, "{jitter:?} attempt {attempt}: {delay:?} > {base:?}");
                if jitter == JitterPolicy::Equal {
                    assert!(delay >= base / 2, "equal jitter keeps at least half");
                }
            }
        }
    }
}
