//! # ConnectivitySupervisor: drives the connectivity state machine.
//!
//! ## Event loop
//! ```text
//! loop {
//!   select! {
//!     ctx.cancelled()      ──► break
//!     events.recv()        ──► handle(ev)
//!     sleep_until(retry)   ──► handle(RetryElapsed)
//!   }
//! }
//!
//! handle(ev):
//!   transition(state, ev) ──► state = next
//!                         ──► readiness.set(next)       (before any action)
//!                         ──► Bus: ConnectivityChanged  (if state changed)
//!                         ──► execute(actions...)
//! ```
//!
//! ## Rules
//! - Readiness is written before actions run, so the online message issued by
//!   `PublishOnline` already passes the ready gate.
//! - `ConnectSession` is guarded: nothing is issued while a connect is in flight;
//!   if the messaging layer already reports a session, `SessionConnected` is fed
//!   back instead of opening a second one.
//! - The in-flight flag clears on any session outcome and on link loss.
//! - At most one reconnect timer is armed; `CancelRetry` disarms it.
//! - The supervisor never waits on the network: every wait is a `select!` over
//!   the channel, the timer and the cancellation token.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::machine::{ConnAction, ConnEvent, transition};
use super::state::{ConnState, Readiness};
use crate::clock::Clock;
use crate::events::{Bus, Event, EventKind};
use crate::link::Link;
use crate::messaging::{Messaging, payload};
use crate::outbox::Outbox;
use crate::policies::BackoffPolicy;
use crate::tasks::Task;

/// Static settings of the supervisor.
#[derive(Clone, Debug)]
pub struct ConnectivityParams {
    /// Device name carried by the online message.
    pub device: String,
    /// Topic of the retained online message.
    pub status_topic: String,
    /// Delay policy between session reconnect attempts.
    pub reconnect: BackoffPolicy,
}

/// Owner of [`ConnState`] and sole writer of [`Readiness`].
pub struct ConnectivitySupervisor {
    state: ConnState,
    readiness: Readiness,
    events: mpsc::Receiver<ConnEvent>,
    messaging: Arc<dyn Messaging>,
    link: Arc<dyn Link>,
    outbox: Outbox,
    clock: Arc<dyn Clock>,
    bus: Bus,
    params: ConnectivityParams,

    connecting: bool,
    retry_attempt: u32,
    retry_at: Option<Instant>,
}

impl ConnectivitySupervisor {
    pub fn new(
        events: mpsc::Receiver<ConnEvent>,
        readiness: Readiness,
        messaging: Arc<dyn Messaging>,
        link: Arc<dyn Link>,
        clock: Arc<dyn Clock>,
        bus: Bus,
        params: ConnectivityParams,
    ) -> Self {
        let outbox = Outbox::new(Arc::clone(&messaging), readiness.clone(), bus.clone());
        readiness.set(ConnState::LinkDown);
        Self {
            state: ConnState::LinkDown,
            readiness,
            events,
            messaging,
            link,
            outbox,
            clock,
            bus,
            params,
            connecting: false,
            retry_attempt: 0,
            retry_at: None,
        }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Applies `first` and every event synthesized while executing its actions.
    fn handle(&mut self, first: ConnEvent) {
        let mut pending = VecDeque::from([first]);

        while let Some(ev) = pending.pop_front() {
            if matches!(
                ev,
                ConnEvent::SessionConnected
                    | ConnEvent::SessionDisconnected { .. }
                    | ConnEvent::LinkLost
            ) {
                self.connecting = false;
            }

            let from = self.state;
            let t = transition(from, &ev);
            if t.is_noop(from) {
                tracing::trace!(state = %from, event = ev.as_label(), "connectivity event ignored");
                continue;
            }

            self.state = t.next;
            self.readiness.set(t.next);
            if from != t.next {
                tracing::debug!(from = %from, to = %t.next, event = ev.as_label(), "connectivity changed");
                self.bus.publish(
                    Event::new(EventKind::ConnectivityChanged)
                        .with_transition(from, t.next)
                        .with_reason(ev.as_label()),
                );
            }

            for action in t.actions {
                self.execute(action, &ev, &mut pending);
            }
        }
    }

    fn execute(&mut self, action: ConnAction, cause: &ConnEvent, pending: &mut VecDeque<ConnEvent>) {
        match action {
            ConnAction::ConnectSession => {
                if self.messaging.connected() {
                    pending.push_back(ConnEvent::SessionConnected);
                } else if self.connecting {
                    tracing::debug!("session connect already in flight");
                } else {
                    self.connecting = true;
                    self.messaging.connect();
                    self.bus.publish(Event::new(EventKind::SessionConnectRequested));
                }
            }
            ConnAction::PublishOnline => {
                self.retry_attempt = 0;
                let now = self.clock.now_ms();
                let topic = &self.params.status_topic;
                let device = &self.params.device;
                self.outbox
                    .send_or_drop(topic, || payload::online(topic, device, now));
            }
            ConnAction::ScheduleRetry => {
                let delay = self.params.reconnect.next(self.retry_attempt);
                self.retry_attempt = self.retry_attempt.saturating_add(1);
                self.retry_at = Some(Instant::now() + delay);

                let mut ev = Event::new(EventKind::ReconnectScheduled)
                    .with_delay(delay)
                    .with_attempt(self.retry_attempt);
                if let ConnEvent::SessionDisconnected { reason } = cause {
                    tracing::warn!(%reason, ?delay, attempt = self.retry_attempt, "session down, reconnect scheduled");
                    ev = ev.with_reason(reason.as_str());
                }
                self.bus.publish(ev);
            }
            ConnAction::CancelRetry => {
                self.retry_at = None;
            }
            ConnAction::DropSession => {
                if self.messaging.connected() {
                    self.messaging.disconnect();
                }
            }
            ConnAction::ReacquireLink => {
                self.link.reconnect();
            }
        }
    }
}

async fn retry_timer(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[async_trait]
impl Task for ConnectivitySupervisor {
    fn name(&self) -> &str {
        "connectivity"
    }

    async fn run(&mut self, ctx: CancellationToken) {
        if self.link.is_connected() {
            self.handle(ConnEvent::LinkAcquired);
        }

        loop {
            let ev = tokio::select! {
                _ = ctx.cancelled() => break,
                ev = self.events.recv() => match ev {
                    Some(ev) => ev,
                    None => {
                        tracing::debug!("connectivity channel closed");
                        break;
                    }
                },
                _ = retry_timer(self.retry_at) => {
                    self.retry_at = None;
                    ConnEvent::RetryElapsed
                }
            };
            self.handle(ev);
        }

        self.readiness.set(ConnState::LinkDown);
    }
}
