//! # TaskActor: lifecycle wrapper around one task.
//!
//! ```text
//! publish ActorStarting ──► task.run(child_token) ──► publish ActorStopped
//!                                   └── panic ──────► publish ActorStopped (reason = panic)
//! ```
//!
//! Tasks are not restarted: activities run for the whole process lifetime and
//! the connectivity supervisor heals the session itself.

use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskBox;

/// Runs a single task and reports its lifecycle on the bus.
pub(crate) struct TaskActor {
    task: TaskBox,
    bus: Bus,
}

impl TaskActor {
    pub(crate) fn new(bus: Bus, task: TaskBox) -> Self {
        Self { task, bus }
    }

    /// Runs the task to completion or cancellation.
    pub(crate) async fn run(mut self, token: CancellationToken) {
        let name: Arc<str> = Arc::from(self.task.name());
        self.bus
            .publish(Event::new(EventKind::ActorStarting).with_actor(Arc::clone(&name)));

        let res = std::panic::AssertUnwindSafe(self.task.run(token))
            .catch_unwind()
            .await;

        let mut stopped = Event::new(EventKind::ActorStopped).with_actor(Arc::clone(&name));
        if let Err(panic) = res {
            let info = panic
                .downcast_ref::<&'static str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(actor = %name, %info, "actor panicked");
            stopped = stopped.with_reason(info);
        }
        self.bus.publish(stopped);
    }
}
