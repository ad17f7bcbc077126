//! Reconnect delay policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to spread reconnects of many devices
//!
//! ## Wiring
//! ```text
//! Config.reconnect: BackoffPolicy
//!      └─► ConnectivitySupervisor on ScheduleRetry:
//!           delay = reconnect.next(attempt); attempt resets when the session comes up
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` first=100ms, factor=1.0 (constant), max=30s, jitter=None.
//! - `Config::default().reconnect` constant 2s, no jitter.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
