//! # Connectivity: link, then session.
//!
//! Link and session callbacks arrive as [`ConnEvent`]s on an `mpsc` channel.
//! The [`ConnectivitySupervisor`] feeds them to the pure [`transition`]
//! function, publishes the resulting [`ConnState`] through [`Readiness`] and
//! executes the requested [`ConnAction`]s.
//!
//! ```text
//! MqttDriver ──┐                                    ┌──► Readiness (AtomicU8)
//! LinkWatcher ─┼──► mpsc<ConnEvent> ──► Supervisor ─┼──► Messaging / Link calls
//! retry timer ─┘                       transition() └──► Bus (ConnectivityChanged, ...)
//! ```

mod machine;
mod state;
mod supervisor;

pub use machine::{ConnAction, ConnEvent, Transition, transition};
pub use state::{ConnState, Readiness};
pub use supervisor::{ConnectivityParams, ConnectivitySupervisor};
