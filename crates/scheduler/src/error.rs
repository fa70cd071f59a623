//! Scheduler error types

use contracts::TrackerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Zero intervals would spin the timer loop
    #[error("task '{name}' has a zero interval")]
    ZeroInterval { name: String },

    #[error("task '{name}' is not scheduled")]
    NotScheduled { name: String },
}

impl SchedulerError {
    pub fn zero_interval(name: impl Into<String>) -> Self {
        Self::ZeroInterval { name: name.into() }
    }

    pub fn not_scheduled(name: impl Into<String>) -> Self {
        Self::NotScheduled { name: name.into() }
    }
}

impl From<SchedulerError> for TrackerError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::ZeroInterval { name } => {
                TrackerError::invalid_configuration(name, "interval must be greater than zero")
            }
            SchedulerError::NotScheduled { name } => {
                TrackerError::invalid_configuration(name, "task is not scheduled")
            }
        }
    }
}
