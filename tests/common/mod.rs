#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use pirvisor::{
    ConnEvent, Link, Messaging, MotionInput, OutboundMessage, PublishError, SensorError, SystemProbe,
};

/// Broker stand-in: connects instantly and records every publish.
pub struct FakeSession {
    connected: AtomicBool,
    connects: AtomicU32,
    sent: Mutex<Vec<OutboundMessage>>,
    events: mpsc::Sender<ConnEvent>,
}

impl FakeSession {
    pub fn new(events: mpsc::Sender<ConnEvent>) -> Arc<Self> {
        Arc::new(Self {
            connected: AtomicBool::new(false),
            connects: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
            events,
        })
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn on(&self, topic: &str) -> Vec<OutboundMessage> {
        self.sent().into_iter().filter(|m| m.topic == topic).collect()
    }
}

impl Messaging for FakeSession {
    fn connect(&self) {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
        let _ = self.events.try_send(ConnEvent::SessionConnected);
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let _ = self.events.try_send(ConnEvent::SessionDisconnected {
            reason: "client disconnect".into(),
        });
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn publish(&self, msg: OutboundMessage) -> Result<(), PublishError> {
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}

/// Link whose state is flipped by the test.
pub struct FakeLink {
    up: AtomicBool,
    reconnects: AtomicU32,
}

impl FakeLink {
    pub fn new(up: bool) -> Arc<Self> {
        Arc::new(Self {
            up: AtomicBool::new(up),
            reconnects: AtomicU32::new(0),
        })
    }

    pub fn set(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    pub fn reconnects(&self) -> u32 {
        self.reconnects.load(Ordering::SeqCst)
    }
}

impl Link for FakeLink {
    fn is_connected(&self) -> bool {
        self.up.load(Ordering::SeqCst)
    }

    fn reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
    }

    fn rssi(&self) -> Option<i32> {
        Some(-61)
    }
}

/// Sensor line driven by the test.
#[derive(Clone, Default)]
pub struct Level(Arc<AtomicBool>);

impl Level {
    pub fn set(&self, high: bool) {
        self.0.store(high, Ordering::SeqCst);
    }
}

impl MotionInput for Level {
    fn read(&mut self) -> Result<bool, SensorError> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

pub struct FixedProbe(pub Option<u64>);

impl SystemProbe for FixedProbe {
    fn free_memory(&self) -> Option<u64> {
        self.0
    }
}
