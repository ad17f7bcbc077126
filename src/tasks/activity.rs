//! # Periodic activities.
//!
//! An [`Activity`] is a synchronous unit of work with a fixed cadence. It never
//! awaits anything: each `tick()` reads the clock, does its bounded work and
//! returns. Tests drive `tick()` directly with a manual clock; at runtime
//! [`ActivityActor`] drives it on a tokio interval.
//!
//! ```text
//! ActivityActor::run(ctx)
//!   loop {
//!     select! {
//!       interval.tick() ──► activity.tick()
//!       ctx.cancelled() ──► break
//!     }
//!   }
//! ```
//!
//! Missed ticks are delayed, not bursted: a stalled runtime resumes with one
//! tick and then keeps the regular period.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::tasks::task::Task;

/// Smallest period accepted by [`ActivityActor`].
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Synchronous periodic unit of work.
pub trait Activity: Send + 'static {
    /// Stable name, used as the actor name in lifecycle events.
    fn name(&self) -> &str;

    /// Time between two ticks.
    fn period(&self) -> Duration;

    /// Runs one cycle. Must not block.
    fn tick(&mut self);
}

/// Runs an [`Activity`] every `period()` until cancelled.
///
/// The first tick fires immediately.
pub struct ActivityActor<A> {
    activity: A,
}

impl<A: Activity> ActivityActor<A> {
    pub fn new(activity: A) -> Self {
        Self { activity }
    }

    /// Returns the wrapped activity.
    pub fn into_inner(self) -> A {
        self.activity
    }
}

#[async_trait]
impl<A: Activity> Task for ActivityActor<A> {
    fn name(&self) -> &str {
        self.activity.name()
    }

    async fn run(&mut self, ctx: CancellationToken) {
        let period = self.activity.period().max(MIN_PERIOD);
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => self.activity.tick(),
                _ = ctx.cancelled() => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counter {
        period: Duration,
        ticks: Arc<AtomicU32>,
    }

    impl Activity for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn period(&self) -> Duration {
            self.period
        }

        fn tick(&mut self) {
            self.ticks.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_immediately_then_every_period() {
        let ticks = Arc::new(AtomicU32::new(0));
        let mut actor = ActivityActor::new(Counter {
            period: Duration::from_millis(100),
            ticks: ticks.clone(),
        });
        assert_eq!(actor.name(), "counter");

        let ctx = CancellationToken::new();
        let child = ctx.clone();
        let handle = tokio::spawn(async move {
            actor.run(child).await;
            actor.into_inner()
        });

        time::sleep(Duration::from_millis(350)).await;
        assert_eq!(ticks.load(Ordering::Relaxed), 4); // t = 0, 100, 200, 300

        ctx.cancel();
        let activity = handle.await.unwrap();
        assert_eq!(activity.ticks.load(Ordering::Relaxed), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_clamped() {
        let ticks = Arc::new(AtomicU32::new(0));
        let mut actor = ActivityActor::new(Counter {
            period: Duration::ZERO,
            ticks: ticks.clone(),
        });

        let ctx = CancellationToken::new();
        let child = ctx.clone();
        let handle = tokio::spawn(async move { actor.run(child).await });

        time::sleep(Duration::from_millis(5)).await;
        ctx.cancel();
        handle.await.unwrap();
        assert!(ticks.load(Ordering::Relaxed) >= 1);
    }
}
