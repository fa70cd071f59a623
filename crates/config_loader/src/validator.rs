//! Configuration validation
//!
//! Rules:
//! - Field-level constraints declared on the config types (`validator` derive)
//! - collector.url is an absolute http(s) URL
//! - collector header names are non-empty and contain no whitespace
//! - log_stream.address is `host:port`
//! - the two queues do not share a database file

use contracts::{TrackerConfig, TrackerError};
use validator::Validate;

/// Validate a parsed configuration
///
/// Returns the first error encountered.
pub fn validate(config: &TrackerConfig) -> Result<(), TrackerError> {
    config
        .validate()
        .map_err(|e| TrackerError::invalid_configuration("config", e.to_string()))?;

    validate_collector(config)?;
    validate_log_stream(config)?;
    validate_storage(config)?;
    Ok(())
}

fn validate_collector(config: &TrackerConfig) -> Result<(), TrackerError> {
    let url = config.collector.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(TrackerError::invalid_configuration(
            "collector.url",
            format!("'{url}' must use http or https"),
        ));
    }

    for name in config.collector.headers.keys() {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(TrackerError::invalid_configuration(
                format!("collector.headers[{name:?}]"),
                "header names must be non-empty and contain no whitespace",
            ));
        }
    }

    if config.collector.timeout_secs == Some(0) {
        return Err(TrackerError::invalid_configuration(
            "collector.timeout_secs",
            "timeout must be > 0 when set",
        ));
    }
    Ok(())
}

fn validate_log_stream(config: &TrackerConfig) -> Result<(), TrackerError> {
    let Some(log_stream) = &config.log_stream else {
        return Ok(());
    };

    let valid_port = log_stream
        .address
        .rsplit_once(':')
        .filter(|(host, _)| !host.is_empty())
        .and_then(|(_, port)| port.parse::<u16>().ok())
        .is_some_and(|port| port > 0);

    if !valid_port {
        return Err(TrackerError::invalid_configuration(
            "log_stream.address",
            format!("'{}' must be host:port", log_stream.address),
        ));
    }
    Ok(())
}

fn validate_storage(config: &TrackerConfig) -> Result<(), TrackerError> {
    let storage = &config.storage;
    if let (Some(locations), Some(logs)) = (&storage.location_queue_path, &storage.log_queue_path) {
        if locations == logs {
            return Err(TrackerError::invalid_configuration(
                "storage.log_queue_path",
                "location and log queues must use different files",
            ));
        }
    }
    Ok(())
}
