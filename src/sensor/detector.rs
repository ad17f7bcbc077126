//! # Rising-edge detection with debounce.
//!
//! [`EdgeDetector::poll`] is called on a fixed cadence. Each call reads one
//! sample and compares it with the previous one:
//!
//! ```text
//! level:   ▁▁▁▁█████▁▁▁█████▁▁▁▁▁▁▁▁▁▁▁█████
//!              ▲        ▲                ▲
//!          accepted  suppressed       accepted
//!              │◄─ ≤ debounce ─►│
//!              │◄──────── > debounce ───►│
//! ```
//!
//! ## Rules
//! - A rising edge is `low → high` between two consecutive polls.
//! - The first rising edge is always accepted.
//! - A later edge is suppressed while `now - last_accepted <= debounce`; the
//!   window is measured from the last *accepted* edge and a suppressed edge
//!   does not extend it.
//! - `last_level` follows every sample, whatever the debounce outcome, so a
//!   glitch low inside the window still re-arms edge detection.
//! - A failed read counts as low.

use std::sync::Arc;

use crate::clock::{Clock, Millis, elapsed};
use crate::events::{Bus, Event, EventKind};
use crate::sensor::input::MotionInput;
use crate::telemetry::SharedTelemetry;

/// An accepted motion edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    /// Device time of the edge.
    pub timestamp_ms: Millis,
    /// Motion count after this edge was recorded.
    pub count: u64,
    /// Device uptime in whole seconds.
    pub uptime_s: u64,
}

/// Private state of the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorState {
    pub last_level: bool,
    /// Time of the last accepted edge, `None` until the first one.
    pub last_edge_ms: Option<Millis>,
}

/// Converts raw samples into debounced [`MotionEvent`]s.
pub struct EdgeDetector {
    input: Box<dyn MotionInput>,
    clock: Arc<dyn Clock>,
    telemetry: Arc<SharedTelemetry>,
    debounce_ms: Millis,
    state: SensorState,
    bus: Bus,
}

impl EdgeDetector {
    pub fn new(
        input: Box<dyn MotionInput>,
        clock: Arc<dyn Clock>,
        telemetry: Arc<SharedTelemetry>,
        debounce_ms: Millis,
        bus: Bus,
    ) -> Self {
        Self {
            input,
            clock,
            telemetry,
            debounce_ms,
            state: SensorState::default(),
            bus,
        }
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Samples the input once; returns an event for an accepted rising edge.
    pub fn poll(&mut self) -> Option<MotionEvent> {
        let level = match self.input.read() {
            Ok(level) => level,
            Err(e) => {
                tracing::debug!(error = %e, label = e.as_label(), "sensor read failed, treating as low");
                false
            }
        };
        let now = self.clock.now_ms();
        let rising = !self.state.last_level && level;
        self.state.last_level = level;

        if !rising {
            return None;
        }

        if let Some(last) = self.state.last_edge_ms {
            let gap = elapsed(now, last);
            if gap <= self.debounce_ms {
                tracing::debug!(now, gap, "motion edge suppressed");
                self.bus.publish(
                    Event::new(EventKind::MotionSuppressed)
                        .with_timestamp(now)
                        .with_delay(std::time::Duration::from_millis(gap)),
                );
                return None;
            }
        }

        self.state.last_edge_ms = Some(now);
        let count = self.telemetry.record_motion(now);
        self.bus.publish(
            Event::new(EventKind::MotionDetected)
                .with_timestamp(now)
                .with_count(count),
        );

        Some(MotionEvent {
            timestamp_ms: now,
            count,
            uptime_s: now / 1000,
        })
    }
}
