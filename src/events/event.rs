//! # Runtime events emitted by the device activities and the runtime.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Sensor events**: accepted and suppressed motion edges
//! - **Connectivity events**: state transitions, connect requests, reconnect scheduling
//! - **Delivery and health events**: dropped publishes, low memory
//! - **Runtime events**: actor lifecycle, shutdown, subscriber faults
//!
//! The [`Event`] struct carries optional metadata such as the motion count,
//! the device timestamp, the topic involved and connectivity states.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use pirvisor::{ConnState, Event, EventKind};
//!
//! let ev = Event::new(EventKind::ConnectivityChanged)
//!     .with_transition(ConnState::LinkDown, ConnState::LinkUpSessionDown);
//!
//! assert_eq!(ev.kind, EventKind::ConnectivityChanged);
//! assert_eq!(ev.to, Some(ConnState::LinkUpSessionDown));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::clock::Millis;
use crate::connectivity::ConnState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Sensor events ===
    /// A rising edge passed the debounce window.
    ///
    /// Sets:
    /// - `count`: motion count after the increment
    /// - `timestamp_ms`: device time of the edge
    MotionDetected,

    /// A rising edge arrived inside the debounce window and was not counted.
    ///
    /// Sets:
    /// - `timestamp_ms`: device time of the edge
    /// - `delay_ms`: time since the last accepted edge
    MotionSuppressed,

    // === Connectivity events ===
    /// The connectivity state machine moved to a new state.
    ///
    /// Sets:
    /// - `from`, `to`: previous and new state
    /// - `reason`: triggering event
    ConnectivityChanged,

    /// A session connect was issued to the messaging capability.
    SessionConnectRequested,

    /// A session reconnect was scheduled after a disconnect.
    ///
    /// Sets:
    /// - `delay_ms`: delay before the attempt
    /// - `attempt`: consecutive attempt number (1-based)
    /// - `reason`: disconnect reason, when known
    ReconnectScheduled,

    // === Delivery and health events ===
    /// A publish was discarded (not ready or rejected by the messaging layer).
    ///
    /// Sets:
    /// - `topic`: destination topic
    /// - `reason`: error label
    PublishDropped,

    /// Free memory fell below the low-memory threshold.
    ///
    /// Sets:
    /// - `value`: free bytes observed
    LowMemory,

    // === Runtime events ===
    /// An actor started running.
    ///
    /// Sets:
    /// - `actor`: actor name
    ActorStarting,

    /// An actor returned (finished or cancelled).
    ///
    /// Sets:
    /// - `actor`: actor name
    ActorStopped,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// All actors stopped within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some actors did not stop in time.
    GraceExceeded,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `actor`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `actor`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the actor or subscriber, if applicable.
    pub actor: Option<Arc<str>>,
    /// Topic of the message involved, if applicable.
    pub topic: Option<Arc<str>>,
    /// Human-readable reason (errors, triggering events, etc.).
    pub reason: Option<Arc<str>>,
    /// Motion count.
    pub count: Option<u64>,
    /// Device monotonic timestamp.
    pub timestamp_ms: Option<Millis>,
    /// Delay or gap in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Generic gauge value (free memory, ...).
    pub value: Option<u64>,
    /// Connectivity state before a transition.
    pub from: Option<ConnState>,
    /// Connectivity state after a transition.
    pub to: Option<ConnState>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            actor: None,
            topic: None,
            reason: None,
            count: None,
            timestamp_ms: None,
            delay_ms: None,
            attempt: None,
            value: None,
            from: None,
            to: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an actor or subscriber name.
    #[inline]
    pub fn with_actor(mut self, actor: impl Into<Arc<str>>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    #[inline]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    #[inline]
    pub fn with_timestamp(mut self, ms: Millis) -> Self {
        self.timestamp_ms = Some(ms);
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    #[inline]
    pub fn with_value(mut self, v: u64) -> Self {
        self.value = Some(v);
        self
    }

    /// Attaches a connectivity transition.
    #[inline]
    pub fn with_transition(mut self, from: ConnState, to: ConnState) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_actor(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_actor(subscriber)
            .with_reason(info)
    }
}
