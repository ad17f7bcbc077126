//! # Monotonic millisecond time source.
//!
//! Every component reads time through [`Clock`], never directly from the OS, so
//! the sensor and telemetry activities can be driven synchronously in tests.
//!
//! - [`MonotonicClock`] milliseconds since construction (device "uptime").
//!   Backed by [`tokio::time::Instant`], so paused tokio time drives it too.
//! - [`ManualClock`] a clock that only moves when told to.
//!
//! Counters are `u64` milliseconds. Differences are taken with [`elapsed`], which
//! wraps instead of panicking if a counter ever rolls over.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::time::Instant;

/// Milliseconds on the device's monotonic counter.
pub type Millis = u64;

/// Source of monotonic millisecond timestamps.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current counter value. Never decreases.
    fn now_ms(&self) -> Millis;
}

/// Returns `now - earlier`, tolerating counter wrap.
#[inline]
pub fn elapsed(now: Millis, earlier: Millis) -> Millis {
    now.wrapping_sub(earlier)
}

/// Uptime clock: counts from the moment it is created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}

/// Clock moved explicitly by the caller.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Millis) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Jumps to an absolute time. Going backwards is ignored.
    pub fn set(&self, ms: Millis) {
        self.now.fetch_max(ms, Ordering::AcqRel);
    }

    /// Moves forward by `ms`.
    pub fn advance(&self, ms: Millis) {
        self.now.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn manual_clock_never_goes_back() {
        let clock = ManualClock::new(100);
        clock.set(50);
        assert_eq!(clock.now_ms(), 100);
        clock.advance(25);
        assert_eq!(clock.now_ms(), 125);
        clock.set(1_000);
        assert_eq!(clock.now_ms(), 1_000);
    }

    #[test]
    fn elapsed_survives_wrap() {
        assert_eq!(elapsed(1_200, 50), 1_150);
        assert_eq!(elapsed(5, u64::MAX - 4), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn monotonic_clock_follows_tokio_time() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.now_ms(), 0);
        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert_eq!(clock.now_ms(), 1_500);
    }
}
