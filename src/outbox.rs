//! # Ready-gated send path.
//!
//! Every publication of the device goes through [`Outbox`]. It checks
//! [`Readiness`] immediately before building a message, never from a cached
//! value, and discards what cannot be sent:
//!
//! ```text
//! send_with(build) ─┬─ !ready ───────────────► Err(NotReady)     (nothing built)
//!                   └─ ready ─► build() ─► messaging.publish(msg)
//!                                              ├─ Ok
//!                                              └─ Err(Rejected)
//! ```
//!
//! Dropped messages are not queued and not retried. [`Outbox::send_or_drop`]
//! reports the drop on the bus as [`EventKind::PublishDropped`].

use std::sync::Arc;

use crate::connectivity::{ConnState, Readiness};
use crate::error::PublishError;
use crate::events::{Bus, Event, EventKind};
use crate::messaging::{Messaging, OutboundMessage};

/// Shared handle to the messaging capability behind the ready gate.
#[derive(Clone)]
pub struct Outbox {
    messaging: Arc<dyn Messaging>,
    readiness: Readiness,
    bus: Bus,
}

impl Outbox {
    pub fn new(messaging: Arc<dyn Messaging>, readiness: Readiness, bus: Bus) -> Self {
        Self {
            messaging,
            readiness,
            bus,
        }
    }

    /// `true` while link and session are both up.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Current connectivity state, for logs.
    pub fn state(&self) -> ConnState {
        self.readiness.state()
    }

    /// Builds and publishes a message if ready.
    ///
    /// `build` runs only after the ready check passed.
    pub fn send_with<F>(&self, build: F) -> Result<(), PublishError>
    where
        F: FnOnce() -> OutboundMessage,
    {
        if !self.is_ready() {
            return Err(PublishError::NotReady);
        }
        self.messaging.publish(build())
    }

    /// Like [`Outbox::send_with`], but a failure is logged and reported on the bus
    /// instead of returned. Returns `true` if the message was handed over.
    pub fn send_or_drop<F>(&self, topic: &str, build: F) -> bool
    where
        F: FnOnce() -> OutboundMessage,
    {
        match self.send_with(build) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(topic, error = %e, "publish dropped");
                self.bus.publish(
                    Event::new(EventKind::PublishDropped)
                        .with_topic(topic)
                        .with_reason(e.as_label()),
                );
                false
            }
        }
    }
}
