//! Layered error definitions
//!
//! `TrackerError` covers config / sensor / storage; `TransportError` covers delivery

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum TrackerError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing or invalid destination / settings
    #[error("invalid configuration at '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },

    // ===== Sensor Errors =====
    /// Location services are switched off on the device
    #[error("location sensor is disabled")]
    SensorDisabled,

    /// The user denied or restricted location access
    #[error("location sensor access is not authorized")]
    SensorUnauthorized,

    /// The host application never declared why it needs location access
    #[error("location authorization usage declaration is missing")]
    MissingAuthorizationDeclaration,

    /// One-shot fetch had nothing to return
    #[error("no last known location sample")]
    NoLastKnownSample,

    // ===== Storage Errors =====
    /// Persistent queue could not be opened (recovered via fallback)
    #[error("failed to open persistent storage: {message}")]
    StorageOpen { message: String },

    /// Queue read/write error
    #[error("storage error: {message}")]
    Storage { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create invalid configuration error
    pub fn invalid_configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// Failure reported by a transport for one batch or one streamed item
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Collector answered with a non-success status
    #[error("collector responded with status {status}")]
    Status { status: u16 },

    /// Connection could not be established or broke mid-request
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Response could not be interpreted
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Request could not be built (bad URL, bad header, bad address)
    #[error("malformed destination '{destination}': {message}")]
    MalformedDestination {
        destination: String,
        message: String,
    },
}

impl TransportError {
    /// Create connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create malformed destination error
    pub fn malformed_destination(
        destination: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedDestination {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// A locally malformed request fails every cycle until reconfigured
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::MalformedDestination { .. })
    }
}
