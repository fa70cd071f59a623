//! TrackerConfig - Config Loader output
//!
//! Static configuration of the tracking service: collector destination, live
//! dispatch defaults, optional log stream and queue storage locations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::{
    Accuracy, DispatchSettings, DEFAULT_SAMPLING_INTERVAL_SECS, DEFAULT_TRANSMISSION_INTERVAL_SECS,
};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackerConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Remote collector receiving location batches
    #[validate(nested)]
    pub collector: CollectorConfig,

    /// Initial live dispatch settings
    #[serde(default)]
    #[validate(nested)]
    pub dispatch: DispatchConfig,

    /// Streaming log destination (disabled when absent)
    #[serde(default)]
    #[validate(nested)]
    pub log_stream: Option<LogStreamConfig>,

    /// Queue storage locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl TrackerConfig {
    /// Configuration posting to `url` with every other section defaulted
    pub fn with_collector_url(url: impl Into<String>) -> Self {
        Self {
            version: ConfigVersion::V1,
            collector: CollectorConfig {
                url: url.into(),
                headers: BTreeMap::new(),
                timeout_secs: None,
            },
            dispatch: DispatchConfig::default(),
            log_stream: None,
            storage: StorageConfig::default(),
        }
    }
}

/// Collector endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CollectorConfig {
    /// Batch POST destination
    #[validate(url)]
    pub url: String,

    /// Extra request headers (e.g. auth tokens)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Optional request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl CollectorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Initial values of the live dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchConfig {
    #[serde(default)]
    pub accuracy: Accuracy,

    /// Minimum spacing between admitted samples
    #[serde(default = "default_sampling_interval_secs")]
    pub sampling_interval_secs: u64,

    /// Batch transmission period
    #[serde(default = "default_transmission_interval_secs")]
    #[validate(range(min = 1))]
    pub transmission_interval_secs: u64,
}

impl DispatchConfig {
    pub fn settings(&self) -> DispatchSettings {
        DispatchSettings {
            accuracy: self.accuracy,
            sampling_interval: Duration::from_secs(self.sampling_interval_secs),
            transmission_interval: Duration::from_secs(self.transmission_interval_secs),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::default(),
            sampling_interval_secs: DEFAULT_SAMPLING_INTERVAL_SECS,
            transmission_interval_secs: DEFAULT_TRANSMISSION_INTERVAL_SECS,
        }
    }
}

fn default_sampling_interval_secs() -> u64 {
    DEFAULT_SAMPLING_INTERVAL_SECS
}

fn default_transmission_interval_secs() -> u64 {
    DEFAULT_TRANSMISSION_INTERVAL_SECS
}

/// Streaming log destination
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogStreamConfig {
    /// `host:port` of the line-oriented log endpoint
    #[validate(length(min = 1))]
    pub address: String,

    /// Account token prefixed to every line
    #[validate(length(min = 1))]
    pub token: String,

    /// Streaming flush period in seconds
    #[serde(default = "default_log_flush_interval_secs")]
    #[validate(range(min = 1))]
    pub flush_interval_secs: u64,
}

impl LogStreamConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

fn default_log_flush_interval_secs() -> u64 {
    5
}

/// Queue storage locations; `None` keeps that queue in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub location_queue_path: Option<PathBuf>,

    #[serde(default)]
    pub log_queue_path: Option<PathBuf>,
}
