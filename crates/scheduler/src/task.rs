//! PeriodicTask - name, interval and the callback fired on every tick

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Future produced by one invocation
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Shared callback, invoked once per firing
pub type TaskCallback = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// Periodic unit of work
#[derive(Clone)]
pub struct PeriodicTask {
    name: String,
    interval: Duration,
    callback: TaskCallback,
}

impl PeriodicTask {
    pub fn new<F, Fut>(name: impl Into<String>, interval: Duration, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: name.into(),
            interval,
            callback: Arc::new(move || Box::pin(callback()) as TaskFuture),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn callback(&self) -> &TaskCallback {
        &self.callback
    }

    /// Same task, different interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
