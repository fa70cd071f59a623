//! Dispatcher error types

use contracts::TrackerError;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Transport could not be constructed from its configuration
    #[error("failed to create transport '{name}': {message}")]
    TransportCreation { name: String, message: String },

    /// Queue drain or requeue failure
    #[error("queue '{queue}' failed: {source}")]
    Queue {
        queue: String,
        #[source]
        source: TrackerError,
    },
}

impl DispatcherError {
    pub fn transport_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn queue(queue: impl Into<String>, source: TrackerError) -> Self {
        Self::Queue {
            queue: queue.into(),
            source,
        }
    }
}

impl From<DispatcherError> for TrackerError {
    fn from(e: DispatcherError) -> Self {
        match e {
            DispatcherError::TransportCreation { name, message } => {
                TrackerError::invalid_configuration(name, message)
            }
            DispatcherError::Queue { source, .. } => source,
        }
    }
}
