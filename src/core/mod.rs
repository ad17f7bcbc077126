//! Runtime core: device assembly, orchestration and lifecycle.
//!
//! The public API from this module is [`Runtime`], which runs tasks until a
//! shutdown signal and enforces the grace period, and [`DeviceBuilder`], which
//! wires the device activities and the connectivity supervisor into tasks.
//!
//! Internal modules:
//! - [`actor`]: runs a single task and publishes its lifecycle events;
//! - [`builder`]: assembles the device from its capabilities;
//! - [`runtime`]: spawns actors, fans events out, handles shutdown;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod actor;
mod builder;
mod runtime;
mod shutdown;

pub use builder::{Components, Device, DeviceBuilder};
pub use runtime::Runtime;
