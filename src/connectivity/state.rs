//! # Connectivity state and the shared readiness flag.
//!
//! [`ConnState`] is owned by the connectivity supervisor. Everyone else sees it
//! through a [`Readiness`] handle: a single atomic written only by the supervisor
//! and read by every publishing activity right before it builds a message.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Two-layer connectivity state: the link first, then the messaging session on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnState {
    /// No network link. Initial state.
    LinkDown,
    /// Link established, messaging session not (yet) established.
    LinkUpSessionDown,
    /// Link and session established: ready to publish.
    SessionUp,
}

impl ConnState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConnState::LinkDown => "link_down",
            ConnState::LinkUpSessionDown => "link_up_session_down",
            ConnState::SessionUp => "session_up",
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnState::SessionUp)
    }

    #[inline]
    pub fn link_up(&self) -> bool {
        !matches!(self, ConnState::LinkDown)
    }

    fn to_u8(self) -> u8 {
        match self {
            ConnState::LinkDown => 0,
            ConnState::LinkUpSessionDown => 1,
            ConnState::SessionUp => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            2 => ConnState::SessionUp,
            1 => ConnState::LinkUpSessionDown,
            _ => ConnState::LinkDown,
        }
    }
}

impl fmt::Display for ConnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Shared, cheaply cloneable view of the connectivity state.
///
/// ### Rules
/// - Written only by the connectivity supervisor (`Release`).
/// - Read by any activity (`Acquire`); a transition is visible to the next read.
/// - Callers must check [`Readiness::is_ready`] right before each send, never cache it.
#[derive(Clone, Debug)]
pub struct Readiness {
    state: Arc<AtomicU8>,
}

impl Readiness {
    /// Creates a handle in [`ConnState::LinkDown`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ConnState::LinkDown.to_u8())),
        }
    }

    pub fn state(&self) -> ConnState {
        ConnState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `true` iff the state is [`ConnState::SessionUp`].
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    pub(crate) fn set(&self, state: ConnState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
