//! Ingestion error types

use contracts::TrackerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    /// Feed refused the subscription (authorization state)
    #[error("sensor feed unavailable: {0}")]
    FeedUnavailable(#[source] TrackerError),

    /// Admitted sample could not be stored
    #[error("failed to enqueue sample: {message}")]
    Enqueue { message: String },
}

impl IngestionError {
    pub fn enqueue(message: impl Into<String>) -> Self {
        Self::Enqueue {
            message: message.into(),
        }
    }
}

impl From<IngestionError> for TrackerError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::FeedUnavailable(inner) => inner,
            IngestionError::Enqueue { message } => TrackerError::storage(message),
        }
    }
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
