//! Live dispatch settings owned by the tracking service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default minimum spacing between admitted samples (seconds)
pub const DEFAULT_SAMPLING_INTERVAL_SECS: u64 = 120;

/// Default spacing between batch transmissions (seconds)
pub const DEFAULT_TRANSMISSION_INTERVAL_SECS: u64 = 300;

/// Requested sensor accuracy class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    #[default]
    High,
    Medium,
    Low,
}

impl Accuracy {
    /// Desired horizontal accuracy in meters for this class
    pub fn desired_meters(self) -> f64 {
        match self {
            Accuracy::High => 10.0,
            Accuracy::Medium => 100.0,
            Accuracy::Low => 1000.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Accuracy::High => "high",
            Accuracy::Medium => "medium",
            Accuracy::Low => "low",
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Accuracy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Accuracy::High),
            "medium" => Ok(Accuracy::Medium),
            "low" => Ok(Accuracy::Low),
            other => Err(format!("unknown accuracy '{other}'")),
        }
    }
}

/// Mutable live parameters of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Accuracy class pushed to the sensor feed
    pub accuracy: Accuracy,
    /// Minimum spacing between admitted samples
    pub sampling_interval: Duration,
    /// Period of the batch dispatch cycle
    pub transmission_interval: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::High,
            sampling_interval: Duration::from_secs(DEFAULT_SAMPLING_INTERVAL_SECS),
            transmission_interval: Duration::from_secs(DEFAULT_TRANSMISSION_INTERVAL_SECS),
        }
    }
}
