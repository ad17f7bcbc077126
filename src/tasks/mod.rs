//! # Task abstractions.
//!
//! This module provides the units the runtime spawns:
//! - [`Task`] - trait for long-running async cancelable tasks
//! - [`TaskFn`] - closure-backed task implementation
//! - [`TaskBox`] - owned task handle (`Box<dyn Task>`)
//! - [`Activity`] - synchronous periodic unit of work
//! - [`ActivityActor`] - adapter running an [`Activity`] on a tokio interval

mod activity;
mod task;
mod task_fn;

pub use activity::{Activity, ActivityActor};
pub use task::{Task, TaskBox};
pub use task_fn::TaskFn;
