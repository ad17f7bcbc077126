//! # pirvisor
//!
//! **pirvisor** is a supervised runtime for a binary motion sensor (PIR): it
//! turns raw samples into debounced motion events and periodic health telemetry
//! and delivers them over MQTT through a link and broker that may come and go.
//!
//! The device is a handful of independently scheduled activities sharing a few
//! atomics, plus a connectivity supervisor that owns the only answer to "may I
//! publish now?".
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  MotionInput        SystemProbe         Link            Messaging (MQTT)
//!      │                   │               │  ▲               │  ▲
//!      ▼                   ▼               │  │ reconnect()   │  │ connect()/publish()
//! ┌──────────────┐  ┌───────────────┐      │  │               │  │
//! │MotionActivity│  │StatusHeartbeat│      ▼  │               ▼  │
//! │ EdgeDetector │  │ MemoryMonitor │   mpsc<ConnEvent> ◄─────┘  │
//! │ EventPublish.│  └──────┬────────┘      │                     │
//! └──────┬───────┘         │               ▼                     │
//!        │                 │      ┌───────────────────────┐      │
//!        │   SharedTelemetry      │ ConnectivitySupervisor│──────┘
//!        │   (AtomicU64 x2)       │  transition(s, ev)    │
//!        │                 │      └──────────┬────────────┘
//!        ▼                 ▼                 ▼ set()
//! ┌────────────────────────────────────────────────────────┐
//! │ Outbox: readiness.is_ready()? build() : drop            │◄── Readiness (AtomicU8)
//! └────────────────────────────────────────────────────────┘
//!
//! Everything above publishes Events ──► Bus ──► SubscriberSet ──► LogWriter, AliveTracker
//! ```
//!
//! ### Lifecycle
//! ```text
//! Config::from_env() ──► Runtime::new(&cfg, subscribers)
//!                    ──► DeviceBuilder::new(cfg).with_task(drivers).build(bus, components)
//!                    ──► Runtime::run(device.into_tasks())
//!                           ├─ one TaskActor per task (ActorStarting / ActorStopped)
//!                           └─ SIGINT/SIGTERM ─► cancel ─► wait up to grace
//! ```
//!
//! ## Features
//! | Area              | Description                                             | Key types / traits                                  |
//! |-------------------|---------------------------------------------------------|-----------------------------------------------------|
//! | **Sensor**        | Rising-edge detection with a fixed debounce window      | [`EdgeDetector`], [`MotionInput`], [`FileInput`]     |
//! | **Connectivity**  | Pure two-layer state machine plus its driver            | [`transition`], [`ConnectivitySupervisor`], [`Readiness`] |
//! | **Activities**    | Motion publication, heartbeat, memory monitor          | [`MotionActivity`], [`StatusHeartbeat`], [`MemoryMonitor`] |
//! | **Messaging**     | Ready-gated best-effort publishing over `rumqttc`       | [`Outbox`], [`Messaging`], [`MqttMessaging`]         |
//! | **Subscriber API**| Hook into runtime events (logging, custom exporters)   | [`Subscribe`], [`LogWriter`]                         |
//! | **Runtime**       | Actors, shutdown signals, grace period                  | [`Runtime`], [`Task`], [`Activity`]                  |
//! | **Configuration** | Defaults plus `PIRVISOR_*` environment overrides        | [`Config`]                                           |
//!
//! ## Example
//! ```rust
//! use pirvisor::{ConnAction, ConnEvent, ConnState, transition};
//!
//! let mut state = ConnState::LinkDown;
//! for ev in [ConnEvent::LinkAcquired, ConnEvent::SessionConnected] {
//!     let t = transition(state, &ev);
//!     state = t.next;
//! }
//! assert!(state.is_ready());
//!
//! let t = transition(state, &ConnEvent::LinkLost);
//! assert_eq!(t.next, ConnState::LinkDown);
//! assert!(t.actions.contains(&ConnAction::ReacquireLink));
//! ```
mod activities;
mod clock;
mod config;
mod connectivity;
mod core;
mod error;
mod events;
mod link;
mod messaging;
mod outbox;
mod policies;
mod probe;
mod sensor;
mod subscribers;
mod tasks;
mod telemetry;

// ---- Public re-exports ----

pub use activities::{EventPublisher, MemoryMonitor, MemoryMonitorParams, MotionActivity, StatusHeartbeat};
pub use clock::{Clock, ManualClock, Millis, MonotonicClock, elapsed};
pub use config::{BrokerConfig, Config, Topics};
pub use connectivity::{
    ConnAction, ConnEvent, ConnState, ConnectivityParams, ConnectivitySupervisor, Readiness, Transition,
    transition,
};
pub use core::{Components, Device, DeviceBuilder, Runtime};
pub use error::{ConfigError, PublishError, RuntimeError, SensorError};
pub use events::{Bus, Event, EventKind};
pub use link::{HostLink, HostLinkWatcher, Link};
pub use messaging::{Messaging, MqttDriver, MqttMessaging, OutboundMessage, QoS, payload};
pub use outbox::Outbox;
pub use policies::{BackoffPolicy, JitterPolicy};
pub use probe::{HostProbe, SystemProbe};
pub use sensor::{EdgeDetector, FileInput, MotionEvent, MotionInput, SensorState};
pub use subscribers::{AliveTracker, LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Activity, ActivityActor, Task, TaskBox, TaskFn};
pub use telemetry::{SharedTelemetry, TelemetrySnapshot};
