//! LocationSample - Ingestion output
//!
//! Positional records as they are queued and shipped to the collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw position event as delivered by the sensor feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,

    /// Horizontal accuracy radius (meters)
    pub horizontal_accuracy: f64,

    /// Altitude (meters)
    pub altitude: f64,

    /// Ground speed (m/s), negative when unknown
    pub speed: f64,

    /// Course over ground (degrees), negative when unknown
    pub course: f64,

    /// Capture time
    pub timestamp: DateTime<Utc>,
}

/// Device/session identity attached to every sample
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Advertising identifier, absent when the platform withholds it
    pub advertising_id: Option<String>,

    /// Whether the user opted into limited ad tracking
    pub limited_tracking: bool,
}

/// Location sample
///
/// Immutable once created; queued, dispatched, and either discarded on
/// delivery or requeued on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub horizontal_accuracy: f64,
    pub altitude: f64,
    pub speed: f64,
    pub course: f64,

    /// Capture time (RFC 3339 on the wire)
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertising_id: Option<String>,

    #[serde(default)]
    pub limited_tracking: bool,
}

impl LocationSample {
    /// Enrich a raw sensor event with cached identity info
    pub fn from_raw(raw: &RawPosition, identity: &DeviceIdentity) -> Self {
        Self {
            latitude: raw.latitude,
            longitude: raw.longitude,
            horizontal_accuracy: raw.horizontal_accuracy,
            altitude: raw.altitude,
            speed: raw.speed,
            course: raw.course,
            timestamp: raw.timestamp,
            advertising_id: identity.advertising_id.clone(),
            limited_tracking: identity.limited_tracking,
        }
    }

    /// Sample at a coordinate with unknown motion, mainly for injection
    pub fn at(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            horizontal_accuracy: 0.0,
            altitude: 0.0,
            speed: -1.0,
            course: -1.0,
            timestamp,
            advertising_id: None,
            limited_tracking: false,
        }
    }
}

/// Batch payload posted to the collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPayload {
    pub locations: Vec<LocationSample>,
}

impl BatchPayload {
    pub fn new(locations: Vec<LocationSample>) -> Self {
        Self { locations }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Give the records back, e.g. for requeueing
    pub fn into_locations(self) -> Vec<LocationSample> {
        self.locations
    }
}
