//! # Device activities.
//!
//! Each activity is a synchronous [`Activity`](crate::Activity) with its own
//! cadence. They share nothing but the [`Outbox`](crate::Outbox), the
//! [`SharedTelemetry`](crate::SharedTelemetry) counters and read-only
//! capability handles.
//!
//! | Activity           | Default period | Sends                              |
//! |--------------------|----------------|------------------------------------|
//! | [`MotionActivity`] | 100 ms         | motion JSON + marker per edge      |
//! | [`StatusHeartbeat`]| 30 s           | retained status JSON               |
//! | [`MemoryMonitor`]  | 10 s           | low-memory warning (when low)      |

mod memory;
mod motion;
mod status;

pub use memory::{MemoryMonitor, MemoryMonitorParams};
pub use motion::{EventPublisher, MotionActivity};
pub use status::StatusHeartbeat;

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::{Arc, Mutex};

    use crate::connectivity::Readiness;
    use crate::error::PublishError;
    use crate::events::Bus;
    use crate::link::Link;
    use crate::messaging::{Messaging, OutboundMessage};
    use crate::outbox::Outbox;
    use crate::probe::SystemProbe;

    #[derive(Default)]
    pub struct Recorder {
        pub sent: Mutex<Vec<OutboundMessage>>,
    }

    impl Recorder {
        pub fn topics(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|m| m.topic.clone()).collect()
        }
    }

    impl Messaging for Recorder {
        fn connect(&self) {}
        fn disconnect(&self) {}
        fn connected(&self) -> bool {
            true
        }
        fn publish(&self, msg: OutboundMessage) -> Result<(), PublishError> {
            self.sent.lock().unwrap().push(msg);
            Ok(())
        }
    }

    pub struct Gauges {
        pub free: Option<u64>,
        pub rssi: Option<i32>,
    }

    impl SystemProbe for Gauges {
        fn free_memory(&self) -> Option<u64> {
            self.free
        }
    }

    impl Link for Gauges {
        fn is_connected(&self) -> bool {
            true
        }
        fn reconnect(&self) {}
        fn rssi(&self) -> Option<i32> {
            self.rssi
        }
    }

    /// Outbox over a recorder; starts not ready.
    pub fn outbox(bus: &Bus) -> (Outbox, Arc<Recorder>, Readiness) {
        let rec = Arc::new(Recorder::default());
        let readiness = Readiness::new();
        let out = Outbox::new(rec.clone(), readiness.clone(), bus.clone());
        (out, rec, readiness)
    }
}
