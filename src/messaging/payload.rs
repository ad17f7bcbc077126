//! Message bodies for the fixed topic schema.

use serde::Serialize;

use crate::clock::Millis;
use crate::sensor::MotionEvent;
use crate::telemetry::TelemetrySnapshot;

use super::OutboundMessage;

/// Text sent on the events topic for every published motion.
pub const MOTION_MARKER: &str = "Motion Detected";
/// Text sent on the error topic when free memory is low.
pub const LOW_MEMORY_WARNING: &str = "Low memory warning";

/// Body of the motion topic.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MotionPayload {
    pub motion: bool,
    pub timestamp_ms: Millis,
    pub count: u64,
    pub uptime_s: u64,
}

impl From<&MotionEvent> for MotionPayload {
    fn from(ev: &MotionEvent) -> Self {
        Self {
            motion: true,
            timestamp_ms: ev.timestamp_ms,
            count: ev.count,
            uptime_s: ev.uptime_s,
        }
    }
}

/// Body of the periodic status message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusPayload {
    pub status: &'static str,
    pub uptime_s: u64,
    pub motion_count: u64,
    pub last_motion_ms: Millis,
    pub free_heap: Option<u64>,
    pub link_rssi: Option<i32>,
}

impl StatusPayload {
    pub fn online(
        now: Millis,
        telemetry: TelemetrySnapshot,
        free_heap: Option<u64>,
        link_rssi: Option<i32>,
    ) -> Self {
        Self {
            status: "online",
            uptime_s: now / 1000,
            motion_count: telemetry.motion_count,
            last_motion_ms: telemetry.last_motion_ms,
            free_heap,
            link_rssi,
        }
    }
}

/// Body of the retained message sent once per session establishment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OnlinePayload<'a> {
    pub status: &'static str,
    pub device: &'a str,
    pub timestamp: Millis,
}

fn json<T: Serialize>(topic: &str, body: &T) -> OutboundMessage {
    // Serializing these plain structs cannot fail.
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    OutboundMessage::new(topic, bytes)
}

/// Motion JSON, QoS 1, not retained.
pub fn motion(topic: &str, ev: &MotionEvent) -> OutboundMessage {
    json(topic, &MotionPayload::from(ev))
}

/// Plain-text motion marker, QoS 1, not retained.
pub fn motion_marker(topic: &str) -> OutboundMessage {
    OutboundMessage::new(topic, MOTION_MARKER)
}

/// Status JSON, QoS 1, retained.
pub fn status(topic: &str, body: &StatusPayload) -> OutboundMessage {
    json(topic, body).retained()
}

/// Startup "online" JSON, QoS 1, retained.
pub fn online(topic: &str, device: &str, now: Millis) -> OutboundMessage {
    let body = OnlinePayload {
        status: "online",
        device,
        timestamp: now,
    };
    json(topic, &body).retained()
}

/// Low-memory warning text, QoS 1, not retained.
pub fn low_memory(topic: &str) -> OutboundMessage {
    OutboundMessage::new(topic, LOW_MEMORY_WARNING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::QoS;
    use serde_json::{Value, json as j};

    fn parse(msg: &OutboundMessage) -> Value {
        serde_json::from_slice(&msg.payload).unwrap()
    }

    #[test]
    fn motion_body() {
        let ev = MotionEvent {
            timestamp_ms: 1_200,
            count: 2,
            uptime_s: 1,
        };
        let msg = motion("motion/detected", &ev);
        assert_eq!(msg.topic, "motion/detected");
        assert!(!msg.retain);
        assert_eq!(msg.qos, QoS::AtLeastOnce);
        assert_eq!(
            parse(&msg),
            j!({"motion": true, "timestamp_ms": 1200, "count": 2, "uptime_s": 1})
        );
    }

    #[test]
    fn status_body_is_retained_and_complete() {
        let snap = TelemetrySnapshot {
            motion_count: 7,
            last_motion_ms: 42_000,
        };
        let msg = status(
            "motion/status",
            &StatusPayload::online(61_500, snap, Some(120_000), Some(-61)),
        );
        assert!(msg.retain);
        assert_eq!(
            parse(&msg),
            j!({
                "status": "online",
                "uptime_s": 61,
                "motion_count": 7,
                "last_motion_ms": 42000,
                "free_heap": 120000,
                "link_rssi": -61
            })
        );
    }

    #[test]
    fn missing_gauges_serialize_as_null() {
        let body = StatusPayload::online(0, TelemetrySnapshot::default(), None, None);
        let v = parse(&status("s", &body));
        assert!(v["free_heap"].is_null());
        assert!(v["link_rssi"].is_null());
    }

    #[test]
    fn online_and_text_bodies() {
        let msg = online("motion/status", "hall-pir", 3_000);
        assert!(msg.retain);
        assert_eq!(
            parse(&msg),
            j!({"status": "online", "device": "hall-pir", "timestamp": 3000})
        );

        assert_eq!(motion_marker("motion/events").payload_str(), MOTION_MARKER);
        let warn = low_memory("motion/error");
        assert_eq!(warn.payload_str(), LOW_MEMORY_WARNING);
        assert!(!warn.retain);
    }
}
