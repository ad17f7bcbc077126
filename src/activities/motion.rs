//! Motion sampling and event publication.
//!
//! ```text
//! tick() ──► EdgeDetector::poll() ──► Some(MotionEvent) ──► EventPublisher::publish()
//!                                                              ├─ motion JSON   ─► motion topic
//!                                                              └─ marker text   ─► events topic
//! ```
//!
//! The count is recorded by the detector before anything is sent, so an edge
//! seen while not ready is still counted; only the messages are dropped.

use std::time::Duration;

use crate::messaging::payload;
use crate::outbox::Outbox;
use crate::sensor::{EdgeDetector, MotionEvent};
use crate::tasks::Activity;

/// Sends the two messages of an accepted motion edge.
#[derive(Clone)]
pub struct EventPublisher {
    outbox: Outbox,
    motion_topic: String,
    events_topic: String,
}

impl EventPublisher {
    pub fn new(outbox: Outbox, motion_topic: impl Into<String>, events_topic: impl Into<String>) -> Self {
        Self {
            outbox,
            motion_topic: motion_topic.into(),
            events_topic: events_topic.into(),
        }
    }

    /// Publishes `ev` if ready; otherwise drops it. Never waits for the broker.
    ///
    /// Returns the number of messages handed over (0, 1 or 2).
    pub fn publish(&self, ev: &MotionEvent) -> usize {
        if !self.outbox.is_ready() {
            tracing::debug!(count = ev.count, "motion not published: not ready");
            return 0;
        }

        let motion = self
            .outbox
            .send_or_drop(&self.motion_topic, || payload::motion(&self.motion_topic, ev));
        let marker = self
            .outbox
            .send_or_drop(&self.events_topic, || payload::motion_marker(&self.events_topic));
        usize::from(motion) + usize::from(marker)
    }
}

/// Samples the sensor and publishes accepted edges.
pub struct MotionActivity {
    detector: EdgeDetector,
    publisher: EventPublisher,
    period: Duration,
}

impl MotionActivity {
    pub fn new(detector: EdgeDetector, publisher: EventPublisher, period: Duration) -> Self {
        Self {
            detector,
            publisher,
            period,
        }
    }
}

impl Activity for MotionActivity {
    fn name(&self) -> &str {
        "motion"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn tick(&mut self) {
        if let Some(ev) = self.detector.poll() {
            tracing::debug!(count = ev.count, timestamp_ms = ev.timestamp_ms, "motion detected");
            self.publisher.publish(&ev);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::fakes;
    use crate::clock::ManualClock;
    use crate::connectivity::ConnState;
    use crate::error::SensorError;
    use crate::events::Bus;
    use crate::messaging::payload::MOTION_MARKER;
    use crate::sensor::MotionInput;
    use crate::subscribers::capture::Records;
    use crate::telemetry::SharedTelemetry;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tracing::Level;

    struct Pin(Arc<AtomicBool>);

    impl MotionInput for Pin {
        fn read(&mut self) -> Result<bool, SensorError> {
            Ok(self.0.load(Ordering::Relaxed))
        }
    }

    #[test]
    fn edge_while_not_ready_is_counted_but_not_sent() {
        let bus = Bus::new(64);
        let (outbox, rec, readiness) = fakes::outbox(&bus);
        let clock = Arc::new(ManualClock::new(0));
        let telemetry = Arc::new(SharedTelemetry::new());
        let pin = Arc::new(AtomicBool::new(false));

        let detector = EdgeDetector::new(
            Box::new(Pin(pin.clone())),
            clock.clone(),
            telemetry.clone(),
            1000,
            bus.clone(),
        );
        let publisher = EventPublisher::new(outbox, "motion/detected", "motion/events");
        let mut activity = MotionActivity::new(detector, publisher, Duration::from_millis(100));

        activity.tick();
        clock.set(100);
        pin.store(true, Ordering::Relaxed);
        activity.tick();
        assert_eq!(telemetry.motion_count(), 1);
        assert!(rec.sent.lock().unwrap().is_empty());

        readiness.set(ConnState::SessionUp);
        clock.set(1200);
        pin.store(false, Ordering::Relaxed);
        activity.tick();
        clock.set(1300);
        pin.store(true, Ordering::Relaxed);
        activity.tick();

        assert_eq!(telemetry.motion_count(), 2);
        assert_eq!(rec.topics(), vec!["motion/detected", "motion/events"]);
        let sent = rec.sent.lock().unwrap();
        assert!(sent[0].payload_str().contains("\"count\":2"));
        assert_eq!(sent[1].payload_str(), MOTION_MARKER);
        assert!(sent.iter().all(|m| !m.retain));
    }

    #[test]
    fn publisher_reports_handed_over_messages() {
        let bus = Bus::new(8);
        let (outbox, _rec, readiness) = fakes::outbox(&bus);
        let publisher = EventPublisher::new(outbox, "m", "e");
        let ev = MotionEvent {
            timestamp_ms: 10,
            count: 1,
            uptime_s: 0,
        };

        assert_eq!(publisher.publish(&ev), 0);
        readiness.set(ConnState::SessionUp);
        assert_eq!(publisher.publish(&ev), 2);
    }

    #[test]
    fn accepted_edge_leaves_info_logging_to_the_event_log() {
        let bus = Bus::new(8);
        let (outbox, _rec, readiness) = fakes::outbox(&bus);
        readiness.set(ConnState::SessionUp);
        let clock = Arc::new(ManualClock::new(0));
        let pin = Arc::new(AtomicBool::new(true));
        let detector = EdgeDetector::new(
            Box::new(Pin(pin)),
            clock,
            Arc::new(SharedTelemetry::new()),
            1000,
            bus.clone(),
        );
        let publisher = EventPublisher::new(outbox, "m", "e");
        let mut activity = MotionActivity::new(detector, publisher, Duration::from_millis(100));

        let records = Records::default();
        records.during(|| activity.tick());

        assert!(records.contains("pirvisor::activities::motion", Level::DEBUG));
        assert!(records.targets_at_least(Level::INFO).is_empty());
    }
}
