//! # Runtime: spawns task actors, fans events out, shuts down gracefully.
//!
//! The [`Runtime`] owns the event bus and the [`SubscriberSet`]. It spawns one
//! actor per task, forwards bus events to subscribers and, on shutdown, cancels
//! every actor and waits up to [`Config::grace`].
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   Vec<TaskBox>  ──►  Runtime::run(tasks)
//!
//! Runtime::new (once per runtime):
//!   subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//! Spawn actors:
//!   connectivity  motion  status  memory  mqtt  link ...
//!       │            │       │       │      │     │
//!       └──► TaskActor::new(bus, task) ─► set.spawn(actor.run(child_token))
//!
//! Shutdown path:
//!   shutdown future (OS signal by default)
//!             └─► Bus.publish(ShutdownRequested)
//!             └─► runtime_token.cancel()   → propagates to child tokens
//!             └─► wait_all_with_grace(grace):
//!                    ├─ Ok (all joined)    → Bus.publish(AllStoppedWithin)
//!                    └─ Timeout exceeded   → Bus.publish(GraceExceeded)
//!                                            (AliveTracker.snapshot() for stuck actors)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pirvisor::{Config, Runtime, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.grace = Duration::from_secs(1);
//!
//!     let runtime = Runtime::new(&cfg, vec![]);
//!     let waiter = TaskFn::boxed("waiter", |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!     });
//!
//!     runtime
//!         .run_until(vec![waiter], tokio::time::sleep(Duration::from_millis(10)))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! [`Config::grace`]: crate::Config::grace

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::{actor::TaskActor, shutdown};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{AliveTracker, Subscribe, SubscriberSet};
use crate::tasks::TaskBox;

/// Coordinates task actors, event delivery and graceful shutdown.
pub struct Runtime {
    grace: Duration,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    alive: Arc<AliveTracker>,
}

impl Runtime {
    /// Creates a runtime with the given subscribers; an [`AliveTracker`] is
    /// always added.
    ///
    /// Must be called inside a tokio runtime: the subscriber workers and the
    /// single bus listener feeding them are spawned here, so repeated
    /// [`Runtime::run_until`] calls deliver each event once.
    pub fn new(cfg: &Config, mut subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let alive = Arc::new(AliveTracker::new());
        subscribers.push(alive.clone());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));

        let runtime = Self {
            grace: cfg.grace,
            bus,
            subs,
            alive,
        };
        runtime.subscriber_listener();
        runtime
    }

    /// Event bus shared with every component of the device.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs `tasks` until they all exit or an OS termination signal arrives.
    pub async fn run(&self, tasks: Vec<TaskBox>) -> Result<(), RuntimeError> {
        self.run_until(tasks, shutdown::os_shutdown()).await
    }

    /// Runs `tasks` until they all exit or `shutdown` completes.
    pub async fn run_until<F>(&self, tasks: Vec<TaskBox>, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let token = CancellationToken::new();

        let mut set = JoinSet::new();
        for task in tasks {
            let actor = TaskActor::new(self.bus.clone(), task);
            set.spawn(actor.run(token.child_token()));
        }

        tokio::select! {
            _ = shutdown => {
                self.bus.publish(Event::new(EventKind::ShutdownRequested));
                token.cancel();
                self.wait_all_with_grace(&mut set).await
            }
            _ = async { while set.join_next().await.is_some() {} } => Ok(()),
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// Waits for every actor within the grace period.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] and returns [`RuntimeError::GraceExceeded`]
    /// naming the stuck actors.
    async fn wait_all_with_grace(&self, set: &mut JoinSet<()>) -> Result<(), RuntimeError> {
        let grace = self.grace;
        let done = async { while set.join_next().await.is_some() {} };

        match tokio::time::timeout(grace, done).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                let stuck = self.alive.snapshot().await;
                set.abort_all();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}
