//! # Connectivity transition function.
//!
//! The state machine is a pure function of `(state, event) → (next, actions)`.
//! It performs no I/O; [`ConnectivitySupervisor`](super::ConnectivitySupervisor)
//! executes the returned [`ConnAction`]s.
//!
//! ## Transitions
//! ```text
//!                 LinkAcquired / ConnectSession
//!   ┌──────────┐ ─────────────────────────────► ┌───────────────────┐
//!   │ LinkDown │                                │ LinkUpSessionDown │◄─┐ SessionDisconnected /
//!   └──────────┘ ◄───────────────────────────── └───────────────────┘  │ ScheduleRetry
//!      ▲   │        LinkLost / CancelRetry,           │      ▲  │      │
//!      │   │        DropSession, ReacquireLink        │      │  └──────┘ RetryElapsed /
//!      │   └─ LinkLost / ReacquireLink                │      │           ConnectSession
//!      │                           SessionConnected / │      │ SessionDisconnected /
//!      │                  CancelRetry, PublishOnline  ▼      │ ScheduleRetry
//!      │                                       ┌───────────┐ │
//!      └───────────────────────────────────────│ SessionUp │─┘
//!         LinkLost / CancelRetry,              └───────────┘
//!         DropSession, ReacquireLink
//! ```
//!
//! ## Rules
//! - Link loss wins: session events are ignored while the link is down.
//! - `SessionConnected` in `SessionUp` is a no-op (no duplicate online message).
//! - `RetryElapsed` reconnects only while the link is still up.
//! - Every other pair is a no-op.

use super::state::ConnState;

/// Inputs to the connectivity state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnEvent {
    /// The network link came up.
    LinkAcquired,
    /// The network link went down.
    LinkLost,
    /// The broker acknowledged the session.
    SessionConnected,
    /// The session ended or a connect attempt failed.
    SessionDisconnected {
        /// Reason reported by the messaging capability.
        reason: String,
    },
    /// The reconnect backoff delay elapsed (internal).
    RetryElapsed,
}

impl ConnEvent {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConnEvent::LinkAcquired => "link_acquired",
            ConnEvent::LinkLost => "link_lost",
            ConnEvent::SessionConnected => "session_connected",
            ConnEvent::SessionDisconnected { .. } => "session_disconnected",
            ConnEvent::RetryElapsed => "retry_elapsed",
        }
    }
}

/// Side effects requested by a transition, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnAction {
    /// Ask the messaging capability to open a session (guarded by the driver).
    ConnectSession,
    /// Publish the retained "online" status message.
    PublishOnline,
    /// Arm the reconnect timer using the backoff policy.
    ScheduleRetry,
    /// Disarm a pending reconnect timer.
    CancelRetry,
    /// Tear down whatever is left of the session.
    DropSession,
    /// Ask the link capability to reacquire the link.
    ReacquireLink,
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ConnState,
    pub actions: Vec<ConnAction>,
}

impl Transition {
    fn to(next: ConnState, actions: &[ConnAction]) -> Self {
        Self {
            next,
            actions: actions.to_vec(),
        }
    }

    fn stay(state: ConnState) -> Self {
        Self::to(state, &[])
    }

    /// `true` if the transition neither changes state nor requests anything.
    pub fn is_noop(&self, from: ConnState) -> bool {
        self.next == from && self.actions.is_empty()
    }
}

/// Computes the next state and the actions to run for `event` in `state`.
///
/// # Example
/// ```
/// use pirvisor::{transition, ConnAction, ConnEvent, ConnState};
///
/// let t = transition(ConnState::LinkDown, &ConnEvent::LinkAcquired);
/// assert_eq!(t.next, ConnState::LinkUpSessionDown);
/// assert_eq!(t.actions, vec![ConnAction::ConnectSession]);
/// ```
pub fn transition(state: ConnState, event: &ConnEvent) -> Transition {
    use ConnAction::*;
    use ConnState::*;

    match (state, event) {
        (LinkDown, ConnEvent::LinkAcquired) => Transition::to(LinkUpSessionDown, &[ConnectSession]),
        (LinkDown, ConnEvent::LinkLost) => Transition::to(LinkDown, &[ReacquireLink]),
        (LinkDown, _) => Transition::stay(LinkDown),

        (LinkUpSessionDown | SessionUp, ConnEvent::LinkLost) => {
            Transition::to(LinkDown, &[CancelRetry, DropSession, ReacquireLink])
        }

        (LinkUpSessionDown, ConnEvent::SessionConnected) => {
            Transition::to(SessionUp, &[CancelRetry, PublishOnline])
        }
        (LinkUpSessionDown, ConnEvent::SessionDisconnected { .. }) => {
            Transition::to(LinkUpSessionDown, &[ScheduleRetry])
        }
        (LinkUpSessionDown, ConnEvent::RetryElapsed) => {
            Transition::to(LinkUpSessionDown, &[ConnectSession])
        }
        (LinkUpSessionDown, ConnEvent::LinkAcquired) => Transition::stay(LinkUpSessionDown),

        (SessionUp, ConnEvent::SessionDisconnected { .. }) => {
            Transition::to(LinkUpSessionDown, &[ScheduleRetry])
        }
        (SessionUp, _) => Transition::stay(SessionUp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnAction::*;
    use ConnState::*;

    fn dropped() -> ConnEvent {
        ConnEvent::SessionDisconnected {
            reason: "io".into(),
        }
    }

    fn run(events: &[ConnEvent]) -> ConnState {
        events
            .iter()
            .fold(LinkDown, |state, ev| transition(state, ev).next)
    }

    #[test]
    fn reaches_session_up_after_link_then_session() {
        assert_eq!(
            run(&[ConnEvent::LinkAcquired, ConnEvent::SessionConnected]),
            SessionUp
        );
    }

    #[test]
    fn session_before_link_does_not_reach_ready() {
        assert_eq!(
            run(&[ConnEvent::SessionConnected, ConnEvent::LinkAcquired]),
            LinkUpSessionDown
        );
    }

    #[test]
    fn link_lost_returns_to_link_down_from_every_state() {
        for state in [LinkDown, LinkUpSessionDown, SessionUp] {
            let t = transition(state, &ConnEvent::LinkLost);
            assert_eq!(t.next, LinkDown, "from {state}");
            assert!(t.actions.contains(&ReacquireLink), "from {state}");
        }
    }

    #[test]
    fn link_lost_drops_session_and_pending_retry() {
        let t = transition(SessionUp, &ConnEvent::LinkLost);
        assert_eq!(t.actions, vec![CancelRetry, DropSession, ReacquireLink]);
    }

    #[test]
    fn session_connected_publishes_online_once() {
        let t = transition(LinkUpSessionDown, &ConnEvent::SessionConnected);
        assert_eq!(t.next, SessionUp);
        assert_eq!(t.actions, vec![CancelRetry, PublishOnline]);

        let again = transition(SessionUp, &ConnEvent::SessionConnected);
        assert!(again.is_noop(SessionUp));
    }

    #[test]
    fn disconnect_schedules_retry_and_retry_reconnects() {
        let t = transition(SessionUp, &dropped());
        assert_eq!(t.next, LinkUpSessionDown);
        assert_eq!(t.actions, vec![ScheduleRetry]);

        let t = transition(LinkUpSessionDown, &dropped());
        assert_eq!(t.actions, vec![ScheduleRetry]);

        let t = transition(LinkUpSessionDown, &ConnEvent::RetryElapsed);
        assert_eq!(t.actions, vec![ConnectSession]);
    }

    #[test]
    fn session_events_ignored_while_link_down() {
        for ev in [ConnEvent::SessionConnected, dropped(), ConnEvent::RetryElapsed] {
            assert!(transition(LinkDown, &ev).is_noop(LinkDown), "{ev:?}");
        }
    }

    #[test]
    fn duplicate_link_acquired_is_noop() {
        assert!(transition(LinkUpSessionDown, &ConnEvent::LinkAcquired).is_noop(LinkUpSessionDown));
        assert!(transition(SessionUp, &ConnEvent::LinkAcquired).is_noop(SessionUp));
        assert!(transition(SessionUp, &ConnEvent::RetryElapsed).is_noop(SessionUp));
    }
}
