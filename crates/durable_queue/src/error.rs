//! Queue error types

use std::path::PathBuf;

use contracts::TrackerError;
use thiserror::Error;

/// Durable queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Backing file could not be opened or initialised
    #[error("failed to open queue at {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// SQLite statement failure
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Record could not be encoded
    #[error("record encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Record encodes to JSON that does not decode back (NaN or infinite floats)
    #[error("record cannot be stored faithfully: {message}")]
    Unrepresentable { message: String },
}

impl QueueError {
    pub fn open(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Open {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<QueueError> for TrackerError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Open { .. } => TrackerError::StorageOpen {
                message: err.to_string(),
            },
            other => TrackerError::storage(other.to_string()),
        }
    }
}
