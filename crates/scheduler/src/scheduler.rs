//! Scheduler - registry of named periodic tasks

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::error::SchedulerError;
use crate::task::{PeriodicTask, TaskCallback};

struct ScheduledTask {
    task: PeriodicTask,
    cancel_tx: watch::Sender<bool>,
    /// Kept so the worker is not detached silently; never aborted
    _worker: JoinHandle<()>,
}

impl ScheduledTask {
    fn stop(self) {
        // Workers observe this between firings only
        let _ = self.cancel_tx.send(true);
    }
}

/// Periodic task scheduler
///
/// Must be used from within a tokio runtime. Dropping the scheduler cancels
/// every task.
#[derive(Default)]
pub struct Scheduler {
    tasks: Mutex<HashMap<String, ScheduledTask>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task`, replacing any task with the same name
    ///
    /// The first firing happens one interval from now.
    #[instrument(name = "scheduler_schedule", skip(self, task), fields(task = %task.name(), interval = ?task.interval()))]
    pub fn schedule(&self, task: PeriodicTask) -> Result<(), SchedulerError> {
        if task.interval().is_zero() {
            return Err(SchedulerError::zero_interval(task.name()));
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let worker = tokio::spawn(run_task(
            task.name().to_string(),
            task.interval(),
            task.callback().clone(),
            cancel_rx,
        ));

        let name = task.name().to_string();
        let previous = self.tasks.lock().insert(
            name.clone(),
            ScheduledTask {
                task,
                cancel_tx,
                _worker: worker,
            },
        );

        if let Some(previous) = previous {
            debug!(task = %name, "replacing scheduled task");
            previous.stop();
        }
        Ok(())
    }

    /// Stop future firings of `name`; unknown names are a no-op
    ///
    /// Returns whether a task was canceled.
    pub fn cancel(&self, name: &str) -> bool {
        let removed = self.tasks.lock().remove(name);
        match removed {
            Some(scheduled) => {
                scheduled.stop();
                debug!(task = %name, "task canceled");
                true
            }
            None => false,
        }
    }

    /// Re-arm `name` with a new interval, keeping its callback
    pub fn reschedule(&self, name: &str, interval: Duration) -> Result<(), SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::zero_interval(name));
        }

        let task = self
            .tasks
            .lock()
            .get(name)
            .map(|scheduled| scheduled.task.clone())
            .ok_or_else(|| SchedulerError::not_scheduled(name))?;

        info!(task = %name, interval = ?interval, "rescheduling task");
        self.schedule(task.with_interval(interval))
    }

    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.tasks.lock().drain().collect();
        for (name, scheduled) in drained {
            scheduled.stop();
            debug!(task = %name, "task canceled");
        }
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.tasks.lock().contains_key(name)
    }

    pub fn interval_of(&self, name: &str) -> Option<Duration> {
        self.tasks.lock().get(name).map(|s| s.task.interval())
    }

    /// Names of scheduled tasks, sorted
    pub fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for (_, scheduled) in self.tasks.get_mut().drain() {
            scheduled.stop();
        }
    }
}

#[instrument(name = "scheduler_task_loop", skip(callback, cancel_rx), fields(task = %name))]
async fn run_task(
    name: String,
    period: Duration,
    callback: TaskCallback,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            changed = cancel_rx.changed() => {
                // Sender dropped counts as cancel too
                if changed.is_err() || *cancel_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                debug!(task = %name, "firing");
                callback().await;
            }
        }
    }

    debug!(task = %name, "task loop stopped");
}
