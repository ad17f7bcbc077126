//! # Logging subscriber.
//!
//! [`LogWriter`] renders bus events as structured `tracing` records under the
//! `pirvisor::events` target. Levels follow how much an operator cares:
//!
//! | Event                                   | Level |
//! |-----------------------------------------|-------|
//! | `MotionSuppressed`, `PublishDropped`    | debug |
//! | `MotionDetected`, `ConnectivityChanged`, lifecycle | info |
//! | `ReconnectScheduled`, `LowMemory`, subscriber overflow | warn |
//! | `GraceExceeded`, `SubscriberPanicked`   | error |
//!
//! ## Output (fmt layer)
//! ```text
//! INFO pirvisor::events: connectivity from=link_down to=link_up_session_down cause=link_acquired
//! INFO pirvisor::events: motion count=3 timestamp_ms=41250
//! WARN pirvisor::events: reconnect scheduled delay_ms=2000 attempt=1 reason="connection refused"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

const TARGET: &str = "pirvisor::events";

/// Writes every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    pub fn new() -> Self {
        Self
    }

    fn write(e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        let actor = e.actor.as_deref().unwrap_or("");

        match e.kind {
            EventKind::MotionDetected => {
                tracing::info!(target: TARGET, seq = e.seq, count = e.count, timestamp_ms = e.timestamp_ms, "motion");
            }
            EventKind::MotionSuppressed => {
                tracing::debug!(target: TARGET, seq = e.seq, timestamp_ms = e.timestamp_ms, gap_ms = e.delay_ms, "motion suppressed");
            }
            EventKind::ConnectivityChanged => {
                let from = e.from.map(|s| s.as_label()).unwrap_or("?");
                let to = e.to.map(|s| s.as_label()).unwrap_or("?");
                tracing::info!(target: TARGET, seq = e.seq, from, to, cause = reason, "connectivity");
            }
            EventKind::SessionConnectRequested => {
                tracing::debug!(target: TARGET, seq = e.seq, "session connect requested");
            }
            EventKind::ReconnectScheduled => {
                tracing::warn!(target: TARGET, seq = e.seq, delay_ms = e.delay_ms, attempt = e.attempt, reason, "reconnect scheduled");
            }
            EventKind::PublishDropped => {
                let topic = e.topic.as_deref().unwrap_or("");
                tracing::debug!(target: TARGET, seq = e.seq, topic, reason, "publish dropped");
            }
            EventKind::LowMemory => {
                tracing::warn!(target: TARGET, seq = e.seq, free = e.value, "low memory");
            }
            EventKind::ActorStarting => {
                tracing::info!(target: TARGET, seq = e.seq, actor, "actor starting");
            }
            EventKind::ActorStopped => {
                tracing::info!(target: TARGET, seq = e.seq, actor, "actor stopped");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: TARGET, seq = e.seq, "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(target: TARGET, seq = e.seq, "all actors stopped within grace");
            }
            EventKind::GraceExceeded => {
                tracing::error!(target: TARGET, seq = e.seq, "grace exceeded");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: TARGET, seq = e.seq, subscriber = actor, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: TARGET, seq = e.seq, subscriber = actor, reason, "subscriber panicked");
            }
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        Self::write(e);
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
