//! # Publish/subscribe capability.
//!
//! The device core never talks MQTT directly; it hands [`OutboundMessage`]s to a
//! [`Messaging`] implementation and learns about the session through
//! [`ConnEvent`](crate::ConnEvent)s pushed into the connectivity supervisor's channel.
//!
//! ## Contents
//! - [`Messaging`] the capability trait (connect/disconnect/connected/publish)
//! - [`OutboundMessage`], [`QoS`] one publish attempt
//! - [`payload`] JSON and text bodies for every topic
//! - [`MqttMessaging`], [`MqttDriver`] the `rumqttc` backed implementation
//!
//! ## Topic schema
//! | Topic    | Payload                | Retained | QoS |
//! |----------|------------------------|----------|-----|
//! | status   | JSON status / online   | yes      | 1   |
//! | motion   | JSON motion            | no       | 1   |
//! | events   | `Motion Detected`      | no       | 1   |
//! | error    | `Low memory warning`   | no       | 1   |

mod mqtt;
pub mod payload;

pub use mqtt::{MqttDriver, MqttMessaging};

use crate::error::PublishError;

/// Delivery level requested from the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl From<QoS> for rumqttc::QoS {
    fn from(q: QoS) -> Self {
        match q {
            QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
            QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

/// One publish attempt. Built right before sending and not kept afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
    pub qos: QoS,
}

impl OutboundMessage {
    /// Non-retained QoS 1 message.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain: false,
            qos: QoS::AtLeastOnce,
        }
    }

    /// Marks the message as retained by the broker.
    pub fn retained(mut self) -> Self {
        self.retain = true;
        self
    }

    /// Payload as UTF-8 text (lossy), for logs and tests.
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Messaging capability consumed by the device core.
///
/// ### Implementation requirements
/// - Every method must return without waiting on the network.
/// - `connect()` may be called again after a failure; it must not open a
///   second session while one is established.
/// - Session outcomes are reported as `SessionConnected` /
///   `SessionDisconnected` events, not through return values.
pub trait Messaging: Send + Sync + 'static {
    /// Starts a session attempt.
    fn connect(&self);

    /// Closes the session, if any.
    fn disconnect(&self);

    /// `true` while a session is established.
    fn connected(&self) -> bool;

    /// Hands `msg` over for best-effort delivery.
    fn publish(&self, msg: OutboundMessage) -> Result<(), PublishError>;
}
