//! Error types used by the pirvisor runtime and its capabilities.
//!
//! This module defines the error enums of the crate:
//!
//! - [`RuntimeError`]: errors raised by the orchestration runtime itself.
//! - [`PublishError`]: a publish attempt that did not reach the messaging layer.
//! - [`SensorError`]: a failed read of the binary motion input.
//! - [`ConfigError`]: invalid or malformed startup configuration.
//!
//! All types provide `as_label` (stable snake_case, for logs/metrics). None of them
//! is fatal to the device: link and session failures are not errors at all but
//! [`ConnEvent`](crate::ConnEvent)s handled by the connectivity supervisor.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the pirvisor runtime.
///
/// These represent failures in the orchestration system itself,
/// such as a shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some actors remained stuck and were abandoned.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the actors that did not stop in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pirvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # A dropped publish.
///
/// Publishing is best effort: a message that cannot be handed to the messaging
/// capability is discarded, never queued or retried. Motion and status data are
/// superseded by the next cycle anyway.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Link or session is down; nothing was built or sent.
    #[error("not ready: link or session down")]
    NotReady,

    /// The messaging capability refused the message (queue full, client closed...).
    #[error("publish rejected: {reason}")]
    Rejected {
        /// Reason reported by the messaging capability.
        reason: String,
    },
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pirvisor::PublishError;
    ///
    /// assert_eq!(PublishError::NotReady.as_label(), "publish_not_ready");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::NotReady => "publish_not_ready",
            PublishError::Rejected { .. } => "publish_rejected",
        }
    }
}

/// # Errors produced when reading the motion input.
///
/// The edge detector treats every read failure as a low level.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SensorError {
    /// The input source could not be read.
    #[error("sensor read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The input source returned something that is not a binary level.
    #[error("sensor value malformed: {value:?}")]
    Malformed {
        /// The raw value that was read.
        value: String,
    },
}

impl SensorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SensorError::Io(_) => "sensor_io",
            SensorError::Malformed { .. } => "sensor_malformed",
        }
    }
}

/// # Errors produced while loading configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was present but could not be parsed.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }

    pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
