//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in subscribers fed from the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   EdgeDetector / Outbox / ConnectivitySupervisor / Runtime
//!        └── publish(Event) ──► Bus ──► Runtime listener ──► SubscriberSet::emit
//!                                                               │
//!                                              ┌────────────────┼──────────────┐
//!                                              ▼                ▼              ▼
//!                                          LogWriter      AliveTracker      custom
//!                                       (tracing records)  (actor names)
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use async_trait::async_trait;
//! use pirvisor::{Event, EventKind, Subscribe};
//!
//! struct MotionCounter;
//!
//! #[async_trait]
//! impl Subscribe for MotionCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::MotionDetected {
//!             // export event.count somewhere
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "motion-counter"
//!     }
//! }
//! ```

mod alive;
mod log;
mod subscribe;
mod subscriber_set;

pub use alive::AliveTracker;
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;

/// Records the target and level of every `tracing` event emitted under it.
#[cfg(test)]
pub(crate) mod capture {
    use std::sync::{Arc, Mutex};

    use tracing::Level;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Clone, Default)]
    pub struct Records(Arc<Mutex<Vec<(String, Level)>>>);

    impl Records {
        /// Runs `f` with this recorder installed as the thread's subscriber.
        pub fn during<R>(&self, f: impl FnOnce() -> R) -> R {
            let subscriber = tracing_subscriber::registry().with(self.clone());
            tracing::subscriber::with_default(subscriber, f)
        }

        /// Targets of records at `level` or more severe.
        pub fn targets_at_least(&self, level: Level) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, l)| *l <= level)
                .map(|(t, _)| t.clone())
                .collect()
        }

        pub fn contains(&self, target: &str, level: Level) -> bool {
            self.0
                .lock()
                .unwrap()
                .iter()
                .any(|(t, l)| t == target && *l == level)
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for Records {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let meta = event.metadata();
            self.0
                .lock()
                .unwrap()
                .push((meta.target().to_string(), *meta.level()));
        }
    }
}
