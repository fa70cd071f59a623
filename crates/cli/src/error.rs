//! Error types for CLI operations.

use contracts::TrackerError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Metrics exporter could not start
    #[error("Failed to start metrics endpoint on port {port}: {message}")]
    Metrics { port: u16, message: String },

    /// Tracking service error
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn metrics(port: u16, message: impl Into<String>) -> Self {
        Self::Metrics {
            port,
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
