//! # Long-running, cancelable task.
//!
//! A task receives a [`CancellationToken`] and should return promptly once it
//! is cancelled. Tasks here own their state and run exactly once: the device
//! never restarts an activity (connectivity is self-healing inside the
//! supervisor instead).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// # Asynchronous, cancelable unit.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run)
/// method that receives a [`CancellationToken`].
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use pirvisor::Task;
///
/// struct Demo {
///     ticks: u32,
/// }
///
/// #[async_trait]
/// impl Task for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&mut self, ctx: CancellationToken) {
///         while !ctx.is_cancelled() && self.ticks < 3 {
///             self.ticks += 1;
///             tokio::task::yield_now().await;
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task until completion or cancellation.
    async fn run(&mut self, ctx: CancellationToken);
}

/// Owned task handle handed to the runtime.
pub type TaskBox = Box<dyn Task>;
