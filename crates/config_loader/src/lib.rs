//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `TrackerConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("geotrack.toml")).unwrap();
//! println!("Collector: {}", config.collector.url);
//! ```

mod parser;
mod validator;

pub use contracts::TrackerConfig;
pub use parser::ConfigFormat;

use contracts::TrackerError;
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Format is detected from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<TrackerConfig, TrackerError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<TrackerConfig, TrackerError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Validate an already constructed configuration
    pub fn validate(config: &TrackerConfig) -> Result<(), TrackerError> {
        validator::validate(config)
    }

    pub fn to_toml(config: &TrackerConfig) -> Result<String, TrackerError> {
        toml::to_string_pretty(config)
            .map_err(|e| TrackerError::config_parse(format!("TOML serialize error: {e}")))
    }

    pub fn to_json(config: &TrackerConfig) -> Result<String, TrackerError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| TrackerError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, TrackerError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            TrackerError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            TrackerError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, TrackerError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
