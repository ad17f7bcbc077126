//! Periodic retained status message.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::link::Link;
use crate::messaging::payload::{self, StatusPayload};
use crate::outbox::Outbox;
use crate::probe::SystemProbe;
use crate::tasks::Activity;
use crate::telemetry::SharedTelemetry;

/// Liveness signal: one retained status JSON per period while ready.
pub struct StatusHeartbeat {
    outbox: Outbox,
    telemetry: Arc<SharedTelemetry>,
    clock: Arc<dyn Clock>,
    probe: Arc<dyn SystemProbe>,
    link: Arc<dyn Link>,
    topic: String,
    period: Duration,
}

impl StatusHeartbeat {
    pub fn new(
        outbox: Outbox,
        telemetry: Arc<SharedTelemetry>,
        clock: Arc<dyn Clock>,
        probe: Arc<dyn SystemProbe>,
        link: Arc<dyn Link>,
        topic: impl Into<String>,
        period: Duration,
    ) -> Self {
        Self {
            outbox,
            telemetry,
            clock,
            probe,
            link,
            topic: topic.into(),
            period,
        }
    }

    /// Current status body; gauges are read at call time.
    pub fn body(&self) -> StatusPayload {
        StatusPayload::online(
            self.clock.now_ms(),
            self.telemetry.snapshot(),
            self.probe.free_memory(),
            self.link.rssi(),
        )
    }
}

impl Activity for StatusHeartbeat {
    fn name(&self) -> &str {
        "status"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn tick(&mut self) {
        if !self.outbox.is_ready() {
            tracing::trace!("heartbeat skipped: not ready");
            return;
        }
        let sent = self
            .outbox
            .send_or_drop(&self.topic, || payload::status(&self.topic, &self.body()));
        if sent {
            tracing::debug!(topic = %self.topic, "status published");
        }
    }
}
