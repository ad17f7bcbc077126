//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the edge detector, the outbox,
//! the connectivity supervisor, activity actors and the runtime.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `EdgeDetector`, `Outbox`, `MemoryMonitor`,
//!   `ConnectivitySupervisor`, `TaskActor`, `Runtime`.
//! - **Consumers**: `Runtime::subscriber_listener()` (fans out to `SubscriberSet`,
//!   which feeds `AliveTracker`, `LogWriter` and user subscribers).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
