//! # Actor lifecycle tracker with sequence-based ordering.
//!
//! [`AliveTracker`] keeps the set of actors that started and have not stopped
//! yet. The runtime reads it when the shutdown grace period runs out, to name
//! the actors that are stuck.
//!
//! ## Rules
//! - Only `ActorStarting` / `ActorStopped` change the alive state.
//! - Events with `seq <= last_seq` for the same actor are rejected (stale).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

#[derive(Debug, Clone, Copy)]
struct ActorState {
    last_seq: u64,
    alive: bool,
}

/// Thread-safe tracker of alive actors.
#[derive(Debug, Default)]
pub struct AliveTracker {
    state: RwLock<HashMap<String, ActorState>>,
}

impl AliveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a lifecycle event; returns `true` if the alive state changed.
    pub async fn update(&self, ev: &Event) -> bool {
        let alive = match ev.kind {
            EventKind::ActorStarting => true,
            EventKind::ActorStopped => false,
            _ => return false,
        };
        let Some(name) = ev.actor.as_deref() else {
            return false;
        };

        let mut state = self.state.write().await;
        if let Some(prev) = state.get(name) {
            if ev.seq <= prev.last_seq {
                return false;
            }
        }
        let prev = state.insert(
            name.to_string(),
            ActorState {
                last_seq: ev.seq,
                alive,
            },
        );
        prev.map_or(alive, |p| p.alive != alive)
    }

    /// Returns the sorted names of actors currently alive.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<String> = state
            .iter()
            .filter(|(_, s)| s.alive)
            .map(|(name, _)| name.clone())
            .collect();
        alive.sort_unstable();
        alive
    }

    pub async fn is_alive(&self, name: &str) -> bool {
        self.state
            .read()
            .await
            .get(name)
            .is_some_and(|s| s.alive)
    }
}

#[async_trait]
impl Subscribe for AliveTracker {
    async fn on_event(&self, event: &Event) {
        self.update(event).await;
    }

    fn name(&self) -> &'static str {
        "alive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracks_start_and_stop() {
        let tracker = AliveTracker::new();
        let start = Event::new(EventKind::ActorStarting).with_actor("motion");
        let other = Event::new(EventKind::ActorStarting).with_actor("connectivity");
        let stop = Event::new(EventKind::ActorStopped).with_actor("motion");

        assert!(tracker.update(&start).await);
        assert!(tracker.update(&other).await);
        assert_eq!(tracker.snapshot().await, vec!["connectivity", "motion"]);

        assert!(tracker.update(&stop).await);
        assert!(!tracker.is_alive("motion").await);
        assert_eq!(tracker.snapshot().await, vec!["connectivity"]);
    }

    #[tokio::test]
    async fn stale_events_are_ignored() {
        let tracker = AliveTracker::new();
        let start = Event::new(EventKind::ActorStarting).with_actor("status");
        let stop = Event::new(EventKind::ActorStopped).with_actor("status");

        assert!(!tracker.update(&stop).await);
        assert!(!tracker.update(&start).await, "start is older than the stop already seen");
        assert!(!tracker.is_alive("status").await);
        assert!(!tracker.update(&Event::new(EventKind::LowMemory)).await);
    }
}
