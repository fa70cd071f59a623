//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::TrackerConfig;

use crate::cli::InfoArgs;
use crate::error::CliError;

const MASK: &str = "****";

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    collector: CollectorInfo,
    dispatch: DispatchInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_stream: Option<LogStreamInfo>,
    storage: StorageInfo,
}

#[derive(Serialize)]
struct CollectorInfo {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    headers: Vec<HeaderInfo>,
}

#[derive(Serialize)]
struct HeaderInfo {
    name: String,
    value: &'static str,
}

#[derive(Serialize)]
struct DispatchInfo {
    accuracy: String,
    desired_accuracy_meters: f64,
    sampling_interval_secs: u64,
    transmission_interval_secs: u64,
}

#[derive(Serialize)]
struct LogStreamInfo {
    address: String,
    token: &'static str,
    flush_interval_secs: u64,
}

#[derive(Serialize)]
struct StorageInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    location_queue_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_queue_path: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &TrackerConfig, args: &InfoArgs) -> ConfigInfo {
    let headers = if args.headers {
        config
            .collector
            .headers
            .keys()
            .map(|name| HeaderInfo {
                name: name.clone(),
                value: MASK,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", config.version),
        collector: CollectorInfo {
            url: config.collector.url.clone(),
            timeout_secs: config.collector.timeout_secs,
            headers,
        },
        dispatch: DispatchInfo {
            accuracy: config.dispatch.accuracy.to_string(),
            desired_accuracy_meters: config.dispatch.accuracy.desired_meters(),
            sampling_interval_secs: config.dispatch.sampling_interval_secs,
            transmission_interval_secs: config.dispatch.transmission_interval_secs,
        },
        log_stream: config.log_stream.as_ref().map(|log_stream| LogStreamInfo {
            address: log_stream.address.clone(),
            token: MASK,
            flush_interval_secs: log_stream.flush_interval_secs,
        }),
        storage: StorageInfo {
            location_queue_path: config
                .storage
                .location_queue_path
                .as_ref()
                .map(|p| p.display().to_string()),
            log_queue_path: config
                .storage
                .log_queue_path
                .as_ref()
                .map(|p| p.display().to_string()),
        },
    }
}

fn print_config_info(config: &TrackerConfig, args: &InfoArgs) {
    println!("=== geotrack configuration ===\n");

    println!("Collector");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ URL: {}", config.collector.url);
    match config.collector.timeout_secs {
        Some(secs) => println!("   ├─ Timeout: {}s", secs),
        None => println!("   ├─ Timeout: client default"),
    }
    if args.headers && !config.collector.headers.is_empty() {
        println!("   └─ Headers ({}):", config.collector.headers.len());
        let count = config.collector.headers.len();
        for (i, name) in config.collector.headers.keys().enumerate() {
            let prefix = if i == count - 1 { "└─" } else { "├─" };
            println!("        {} {}: {}", prefix, name, MASK);
        }
    } else {
        println!("   └─ Headers: {}", config.collector.headers.len());
    }

    let dispatch = &config.dispatch;
    println!("\nDispatch");
    println!(
        "   ├─ Accuracy: {} ({} m)",
        dispatch.accuracy,
        dispatch.accuracy.desired_meters()
    );
    println!("   ├─ Sampling interval: {}s", dispatch.sampling_interval_secs);
    println!(
        "   └─ Transmission interval: {}s",
        dispatch.transmission_interval_secs
    );

    println!("\nLog stream");
    match &config.log_stream {
        Some(log_stream) => {
            println!("   ├─ Address: {}", log_stream.address);
            println!("   ├─ Token: {}", MASK);
            println!("   └─ Flush interval: {}s", log_stream.flush_interval_secs);
        }
        None => println!("   └─ disabled"),
    }

    println!("\nStorage");
    let describe = |path: &Option<std::path::PathBuf>| match path {
        Some(path) => path.display().to_string(),
        None => "in memory".to_string(),
    };
    println!("   ├─ Locations: {}", describe(&config.storage.location_queue_path));
    println!("   └─ Logs: {}", describe(&config.storage.log_queue_path));

    println!();
}
