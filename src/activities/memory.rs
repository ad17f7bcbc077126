//! Memory monitor: liveness log line plus the low-memory anomaly signal.
//!
//! Runs on its own cadence, separate from the heartbeat. The warning goes out
//! once per cycle for as long as memory stays low.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::events::{Bus, Event, EventKind};
use crate::link::Link;
use crate::messaging::payload;
use crate::outbox::Outbox;
use crate::probe::SystemProbe;
use crate::tasks::Activity;
use crate::telemetry::SharedTelemetry;

pub struct MemoryMonitor {
    outbox: Outbox,
    telemetry: Arc<SharedTelemetry>,
    clock: Arc<dyn Clock>,
    probe: Arc<dyn SystemProbe>,
    link: Arc<dyn Link>,
    bus: Bus,
    topic: String,
    threshold: u64,
    period: Duration,
}

/// Construction parameters for [`MemoryMonitor`].
pub struct MemoryMonitorParams {
    /// Error topic of the warning.
    pub topic: String,
    /// Free bytes below which the warning fires.
    pub threshold: u64,
    pub period: Duration,
}

impl MemoryMonitor {
    pub fn new(
        outbox: Outbox,
        telemetry: Arc<SharedTelemetry>,
        clock: Arc<dyn Clock>,
        probe: Arc<dyn SystemProbe>,
        link: Arc<dyn Link>,
        bus: Bus,
        params: MemoryMonitorParams,
    ) -> Self {
        Self {
            outbox,
            telemetry,
            clock,
            probe,
            link,
            bus,
            topic: params.topic,
            threshold: params.threshold,
            period: params.period,
        }
    }

    /// Returns the free bytes if they are below the threshold.
    fn low(&self) -> Option<u64> {
        self.probe.free_memory().filter(|&free| free < self.threshold)
    }
}

impl Activity for MemoryMonitor {
    fn name(&self) -> &str {
        "memory"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn tick(&mut self) {
        tracing::info!(
            uptime_s = self.clock.now_ms() / 1000,
            motion_count = self.telemetry.motion_count(),
            link = self.link.is_connected(),
            session = %self.outbox.state(),
            "alive"
        );

        let Some(free) = self.low() else {
            return;
        };
        tracing::warn!(free, threshold = self.threshold, "low memory");
        self.bus.publish(Event::new(EventKind::LowMemory).with_value(free));
        self.outbox
            .send_or_drop(&self.topic, || payload::low_memory(&self.topic));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::fakes;
    use crate::clock::ManualClock;
    use crate::connectivity::{ConnState, Readiness};
    use crate::messaging::payload::LOW_MEMORY_WARNING;

    fn monitor(free: Option<u64>, bus: &Bus) -> (MemoryMonitor, Arc<fakes::Recorder>, Readiness) {
        let (outbox, rec, readiness) = fakes::outbox(bus);
        let gauges = Arc::new(fakes::Gauges { free, rssi: None });
        let mon = MemoryMonitor::new(
            outbox,
            Arc::new(SharedTelemetry::new()),
            Arc::new(ManualClock::new(10_000)),
            gauges.clone(),
            gauges,
            bus.clone(),
            MemoryMonitorParams {
                topic: "motion/error".into(),
                threshold: 10_000,
                period: Duration::from_secs(10),
            },
        );
        (mon, rec, readiness)
    }

    #[test]
    fn low_memory_warns_every_cycle_while_ready() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (mut mon, rec, readiness) = monitor(Some(9_999), &bus);
        readiness.set(ConnState::SessionUp);

        mon.tick();
        mon.tick();

        let sent = rec.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].topic, "motion/error");
        assert_eq!(sent[0].payload_str(), LOW_MEMORY_WARNING);
        assert!(!sent[0].retain);

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::LowMemory);
        assert_eq!(ev.value, Some(9_999));
    }

    #[test]
    fn low_memory_while_not_ready_is_reported_but_not_sent() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (mut mon, rec, _readiness) = monitor(Some(512), &bus);

        mon.tick();
        assert!(rec.sent.lock().unwrap().is_empty());
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::LowMemory);
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::PublishDropped);
    }

    #[test]
    fn enough_or_unknown_memory_is_quiet() {
        let bus = Bus::new(16);
        for free in [Some(10_000), None] {
            let (mut mon, rec, readiness) = monitor(free, &bus);
            readiness.set(ConnState::SessionUp);
            mon.tick();
            assert!(rec.sent.lock().unwrap().is_empty(), "{free:?}");
        }
    }
}
