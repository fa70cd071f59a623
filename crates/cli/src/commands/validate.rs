//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::TrackerConfig;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    collector_url: String,
    accuracy: String,
    sampling_interval_secs: u64,
    transmission_interval_secs: u64,
    log_stream: bool,
    persistent_queues: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            let persistent_queues = [
                &config.storage.location_queue_path,
                &config.storage.log_queue_path,
            ]
            .iter()
            .filter(|path| path.is_some())
            .count();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    collector_url: config.collector.url.clone(),
                    accuracy: config.dispatch.accuracy.to_string(),
                    sampling_interval_secs: config.dispatch.sampling_interval_secs,
                    transmission_interval_secs: config.dispatch.transmission_interval_secs,
                    log_stream: config.log_stream.is_some(),
                    persistent_queues,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &TrackerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.storage.location_queue_path.is_none() {
        warnings.push(
            "storage.location_queue_path is unset - undelivered locations are lost on exit"
                .to_string(),
        );
    }
    if config.log_stream.is_some() && config.storage.log_queue_path.is_none() {
        warnings.push(
            "storage.log_queue_path is unset - undelivered log lines are lost on exit".to_string(),
        );
    }

    if config.collector.url.starts_with("http://") {
        warnings.push("collector URL is plain http - batches are sent unencrypted".to_string());
    }

    if config.dispatch.sampling_interval_secs == 0 {
        warnings.push("dispatch.sampling_interval_secs is 0 - every fix is admitted".to_string());
    } else if config.dispatch.sampling_interval_secs > config.dispatch.transmission_interval_secs {
        warnings.push(
            "sampling interval exceeds transmission interval - some cycles will send nothing"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Collector: {}", summary.collector_url);
            println!("  Accuracy: {}", summary.accuracy);
            println!("  Sampling interval: {}s", summary.sampling_interval_secs);
            println!(
                "  Transmission interval: {}s",
                summary.transmission_interval_secs
            );
            println!(
                "  Log stream: {}",
                if summary.log_stream { "enabled" } else { "disabled" }
            );
            println!("  Persistent queues: {}", summary.persistent_queues);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
