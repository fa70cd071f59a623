//! Configuration parsing
//!
//! TOML (primary) and JSON.

use contracts::{TrackerConfig, TrackerError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<TrackerConfig, TrackerError> {
    toml::from_str(content).map_err(|e| TrackerError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<TrackerConfig, TrackerError> {
    serde_json::from_str(content).map_err(|e| TrackerError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<TrackerConfig, TrackerError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Accuracy;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[collector]
url = "https://collector.example.com/v1/locations"
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.collector.url, "https://collector.example.com/v1/locations");
        assert_eq!(config.dispatch.sampling_interval_secs, 120);
        assert_eq!(config.dispatch.transmission_interval_secs, 300);
        assert!(config.log_stream.is_none());
        assert!(config.storage.location_queue_path.is_none());
    }

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
[collector]
url = "https://collector.example.com/v1/locations"
timeout_secs = 10
[collector.headers]
x-api-key = "secret"

[dispatch]
accuracy = "medium"
sampling_interval_secs = 30
transmission_interval_secs = 60

[log_stream]
address = "logs.example.com:10000"
token = "abc"

[storage]
location_queue_path = "/var/lib/geotrack/locations.db"
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.collector.headers.get("x-api-key").map(String::as_str), Some("secret"));
        assert_eq!(config.dispatch.accuracy, Accuracy::Medium);
        let log_stream = config.log_stream.unwrap();
        assert_eq!(log_stream.flush_interval_secs, 5);
        assert!(config.storage.log_queue_path.is_none());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "collector": { "url": "http://localhost:8080/ingest" },
            "dispatch": { "accuracy": "low" }
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.dispatch.accuracy, Accuracy::Low);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(TrackerError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_unknown_accuracy() {
        let content = r#"
[collector]
url = "https://collector.example.com"
[dispatch]
accuracy = "extreme"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
