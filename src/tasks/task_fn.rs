//! # Closure-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: FnMut(CancellationToken) -> Fut`. Handy for
//! one-off glue (and tests) where a dedicated struct would be noise.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use pirvisor::{Task, TaskBox, TaskFn};
//!
//! let t: TaskBox = TaskFn::boxed("waiter", |ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//! });
//!
//! assert_eq!(t.name(), "waiter");
//! ```

use std::borrow::Cow;
use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::tasks::task::{Task, TaskBox};

/// Closure-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new closure-backed task.
    ///
    /// Prefer [`TaskFn::boxed`] when you immediately need a [`TaskBox`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> TaskFn<F>
where
    F: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Creates the task and returns it as an owned handle (`Box<dyn Task>`).
    pub fn boxed(name: impl Into<Cow<'static, str>>, f: F) -> TaskBox {
        Box::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: FnMut(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&mut self, ctx: CancellationToken) {
        (self.f)(ctx).await
    }
}
