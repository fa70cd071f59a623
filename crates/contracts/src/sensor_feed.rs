//! SensorFeed trait - Location sensor abstraction
//!
//! Decouples the pipeline from the platform location subsystem. Real and mock
//! feeds implement the same callback-based interface.

use std::sync::Arc;

use crate::{Accuracy, DeviceIdentity, RawPosition, TrackerError};

/// Position callback type
///
/// Invoked on the feed's own delivery context for every raw event.
pub type PositionCallback = Arc<dyn Fn(RawPosition) + Send + Sync>;

/// Authorization state reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorAuthorization {
    /// Access granted
    Authorized,
    /// Location services switched off device-wide
    Disabled,
    /// User denied or restricted access
    Unauthorized,
    /// Host application lacks the required usage declaration
    Undeclared,
}

impl SensorAuthorization {
    /// Map the state to the error a caller should see
    pub fn check(self) -> Result<(), TrackerError> {
        match self {
            SensorAuthorization::Authorized => Ok(()),
            SensorAuthorization::Disabled => Err(TrackerError::SensorDisabled),
            SensorAuthorization::Unauthorized => Err(TrackerError::SensorUnauthorized),
            SensorAuthorization::Undeclared => Err(TrackerError::MissingAuthorizationDeclaration),
        }
    }
}

/// Location sensor feed
///
/// # Example
///
/// ```ignore
/// feed.subscribe(Arc::new(|position| {
///     println!("fix at {}", position.timestamp);
/// }));
/// // ...
/// feed.cancel();
/// ```
pub trait SensorFeed: Send + Sync {
    /// Current authorization state
    fn authorization(&self) -> SensorAuthorization;

    /// Register the position callback
    ///
    /// Subscribing again replaces the previous callback.
    fn subscribe(&self, callback: PositionCallback);

    /// Stop delivering positions; no-op when not subscribed
    fn cancel(&self);

    /// Whether a callback is currently registered
    fn is_subscribed(&self) -> bool;

    /// Apply a new accuracy class to the live subscription
    fn set_accuracy(&self, accuracy: Accuracy);

    /// Most recent fix known to the platform, if any
    fn last_known(&self) -> Option<RawPosition>;
}

/// Device/session identity lookup
pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> DeviceIdentity;
}

/// Identity provider returning a fixed value
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub DeviceIdentity);

impl IdentityProvider for StaticIdentity {
    fn identity(&self) -> DeviceIdentity {
        self.0.clone()
    }
}
