//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::TrackerConfig;
use ingestion::RandomWalkConfig;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut config, args);
    config_loader::ConfigLoader::validate(&config)
        .context("Configuration invalid after applying command-line overrides")?;

    info!(
        collector = %config.collector.url,
        accuracy = %config.dispatch.accuracy,
        sampling_interval_secs = config.dispatch.sampling_interval_secs,
        transmission_interval_secs = config.dispatch.transmission_interval_secs,
        log_stream = config.log_stream.is_some(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        tracker: config,
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
        walk: RandomWalkConfig {
            period: Duration::from_millis(args.fix_period_ms.max(1)),
            seed: args.seed,
            ..Default::default()
        },
        heartbeat: (args.heartbeat > 0).then(|| Duration::from_secs(args.heartbeat)),
    };

    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    stats.print_summary();

    info!("geotrack finished");
    Ok(())
}

fn apply_overrides(config: &mut TrackerConfig, args: &RunArgs) {
    if let Some(ref url) = args.collector_url {
        info!(url = %url, "Overriding collector URL from CLI");
        config.collector.url = url.clone();
    }
    if let Some(accuracy) = args.accuracy {
        config.dispatch.accuracy = accuracy;
    }
    if let Some(secs) = args.sampling_interval {
        config.dispatch.sampling_interval_secs = secs;
    }
    if let Some(secs) = args.transmission_interval {
        config.dispatch.transmission_interval_secs = secs;
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &TrackerConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Collector: {}", config.collector.url);
    if let Some(timeout) = config.collector.timeout_secs {
        println!("  Timeout: {}s", timeout);
    }
    println!("\nDispatch:");
    println!("  Accuracy: {}", config.dispatch.accuracy);
    println!("  Sampling interval: {}s", config.dispatch.sampling_interval_secs);
    println!(
        "  Transmission interval: {}s",
        config.dispatch.transmission_interval_secs
    );

    match &config.log_stream {
        Some(log_stream) => {
            println!("\nLog stream: {}", log_stream.address);
            println!("  Flush interval: {}s", log_stream.flush_interval_secs);
        }
        None => println!("\nLog stream: disabled"),
    }

    println!("\nStorage:");
    print_queue_path("locations", config.storage.location_queue_path.as_deref());
    print_queue_path("logs", config.storage.log_queue_path.as_deref());
    println!();
}

fn print_queue_path(queue: &str, path: Option<&std::path::Path>) {
    match path {
        Some(path) => println!("  {}: {}", queue, path.display()),
        None => println!("  {}: in memory", queue),
    }
}
