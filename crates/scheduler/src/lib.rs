//! # Scheduler
//!
//! Named periodic tasks on the tokio runtime.
//!
//! Each task owns its timer loop: the first firing happens one interval after
//! scheduling, a slow callback delays only its own next firing, and canceling
//! never interrupts an invocation that is already running.

pub mod error;
pub mod scheduler;
pub mod task;

pub use error::SchedulerError;
pub use scheduler::Scheduler;
pub use task::{PeriodicTask, TaskCallback, TaskFuture};
