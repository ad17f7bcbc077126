//! # Shared telemetry counters.
//!
//! [`SharedTelemetry`] is the small piece of state every activity sees:
//! written by the motion activity, read by the heartbeat and the memory monitor.
//!
//! ## Rules
//! - One atomic per scalar, no lock.
//! - `motion_count` only grows (`fetch_add`).
//! - `last_motion_ms` only grows (`fetch_max`).
//! - The two fields are **not** read together atomically; a reader may see the new
//!   count with the previous timestamp for a moment.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::Millis;

/// Counters shared by the motion, heartbeat and memory activities.
#[derive(Debug, Default)]
pub struct SharedTelemetry {
    motion_count: AtomicU64,
    last_motion_ms: AtomicU64,
}

/// Point-in-time copy of [`SharedTelemetry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetrySnapshot {
    pub motion_count: u64,
    pub last_motion_ms: Millis,
}

impl SharedTelemetry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted motion edge at `now` and returns the new count.
    ///
    /// The returned value is the result of the increment itself, so any message
    /// that reports it is causally after the increment.
    pub fn record_motion(&self, now: Millis) -> u64 {
        let count = self.motion_count.fetch_add(1, Ordering::AcqRel) + 1;
        self.last_motion_ms.fetch_max(now, Ordering::AcqRel);
        count
    }

    pub fn motion_count(&self) -> u64 {
        self.motion_count.load(Ordering::Acquire)
    }

    pub fn last_motion_ms(&self) -> Millis {
        self.last_motion_ms.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            motion_count: self.motion_count(),
            last_motion_ms: self.last_motion_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn record_motion_counts_and_stamps() {
        let t = SharedTelemetry::new();
        assert_eq!(t.snapshot(), TelemetrySnapshot::default());

        assert_eq!(t.record_motion(50), 1);
        assert_eq!(t.record_motion(1_200), 2);
        assert_eq!(
            t.snapshot(),
            TelemetrySnapshot {
                motion_count: 2,
                last_motion_ms: 1_200
            }
        );
    }

    #[test]
    fn last_motion_never_moves_back() {
        let t = SharedTelemetry::new();
        t.record_motion(2_000);
        t.record_motion(1_000);
        assert_eq!(t.last_motion_ms(), 2_000);
        assert_eq!(t.motion_count(), 2);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let t = Arc::new(SharedTelemetry::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let t = Arc::clone(&t);
                std::thread::spawn(move || {
                    for n in 0..1_000 {
                        t.record_motion(i * 1_000 + n);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(t.motion_count(), 4_000);
        assert_eq!(t.last_motion_ms(), 3_999);
    }
}
