//! # Device assembly.
//!
//! [`DeviceBuilder`] turns a [`Config`] plus the external capabilities into the
//! set of tasks the [`Runtime`](crate::Runtime) runs.
//!
//! ```text
//! DeviceBuilder::new(cfg)
//!    ├── conn_events() ──► Sender<ConnEvent>   (given to MqttMessaging / HostLink)
//!    ├── with_task(driver)                     (capability drivers)
//!    └── build(bus, Components)
//!           ├── SharedTelemetry, Readiness, Outbox
//!           ├── ConnectivitySupervisor      ("connectivity")
//!           ├── MotionActivity              ("motion")
//!           ├── StatusHeartbeat             ("status")
//!           └── MemoryMonitor               ("memory")
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::activities::{EventPublisher, MemoryMonitor, MemoryMonitorParams, MotionActivity, StatusHeartbeat};
use crate::clock::Clock;
use crate::config::Config;
use crate::connectivity::{ConnEvent, ConnectivityParams, ConnectivitySupervisor, Readiness};
use crate::events::Bus;
use crate::link::Link;
use crate::messaging::Messaging;
use crate::outbox::Outbox;
use crate::probe::SystemProbe;
use crate::sensor::{EdgeDetector, MotionInput};
use crate::tasks::{ActivityActor, TaskBox};
use crate::telemetry::SharedTelemetry;

/// External capabilities of the device.
pub struct Components {
    pub messaging: Arc<dyn Messaging>,
    pub link: Arc<dyn Link>,
    pub input: Box<dyn MotionInput>,
    pub probe: Arc<dyn SystemProbe>,
    pub clock: Arc<dyn Clock>,
}

/// Collects the configuration and capability drivers of the device.
pub struct DeviceBuilder {
    cfg: Config,
    conn_tx: mpsc::Sender<ConnEvent>,
    conn_rx: mpsc::Receiver<ConnEvent>,
    extra: Vec<TaskBox>,
}

/// An assembled device: its tasks plus handles to the shared state.
pub struct Device {
    telemetry: Arc<SharedTelemetry>,
    readiness: Readiness,
    tasks: Vec<TaskBox>,
}

impl DeviceBuilder {
    pub fn new(cfg: Config) -> Self {
        let (conn_tx, conn_rx) = mpsc::channel(cfg.conn_queue_clamped());
        Self {
            cfg,
            conn_tx,
            conn_rx,
            extra: Vec::new(),
        }
    }

    /// Sender for link and session events, to hand to capability drivers.
    pub fn conn_events(&self) -> mpsc::Sender<ConnEvent> {
        self.conn_tx.clone()
    }

    /// Adds a task that runs alongside the device (capability drivers).
    pub fn with_task(mut self, task: TaskBox) -> Self {
        self.extra.push(task);
        self
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Wires the device; nothing runs until the tasks are handed to a runtime.
    pub fn build(self, bus: &Bus, c: Components) -> Device {
        let cfg = self.cfg;
        let telemetry = Arc::new(SharedTelemetry::new());
        let readiness = Readiness::new();
        let outbox = Outbox::new(Arc::clone(&c.messaging), readiness.clone(), bus.clone());

        let supervisor = ConnectivitySupervisor::new(
            self.conn_rx,
            readiness.clone(),
            Arc::clone(&c.messaging),
            Arc::clone(&c.link),
            Arc::clone(&c.clock),
            bus.clone(),
            ConnectivityParams {
                device: cfg.device.clone(),
                status_topic: cfg.topics.status.clone(),
                reconnect: cfg.reconnect,
            },
        );

        let detector = EdgeDetector::new(
            c.input,
            Arc::clone(&c.clock),
            Arc::clone(&telemetry),
            cfg.debounce_ms(),
            bus.clone(),
        );
        let publisher = EventPublisher::new(outbox.clone(), cfg.topics.motion.clone(), cfg.topics.events.clone());
        let motion = MotionActivity::new(detector, publisher, cfg.sample_period);

        let status = StatusHeartbeat::new(
            outbox.clone(),
            Arc::clone(&telemetry),
            Arc::clone(&c.clock),
            Arc::clone(&c.probe),
            Arc::clone(&c.link),
            cfg.topics.status.clone(),
            cfg.status_period,
        );

        let memory = MemoryMonitor::new(
            outbox,
            Arc::clone(&telemetry),
            c.clock,
            c.probe,
            c.link,
            bus.clone(),
            MemoryMonitorParams {
                topic: cfg.topics.error.clone(),
                threshold: cfg.low_memory_threshold,
                period: cfg.memory_period,
            },
        );

        let mut tasks: Vec<TaskBox> = vec![
            Box::new(supervisor),
            Box::new(ActivityActor::new(motion)),
            Box::new(ActivityActor::new(status)),
            Box::new(ActivityActor::new(memory)),
        ];
        tasks.extend(self.extra);

        Device {
            telemetry,
            readiness,
            tasks,
        }
    }
}

impl Device {
    /// Shared motion counters.
    pub fn telemetry(&self) -> Arc<SharedTelemetry> {
        Arc::clone(&self.telemetry)
    }

    /// Read-only view of the connectivity state.
    pub fn readiness(&self) -> Readiness {
        self.readiness.clone()
    }

    /// Names of the tasks, in spawn order.
    pub fn task_names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn into_tasks(self) -> Vec<TaskBox> {
        self.tasks
    }
}
