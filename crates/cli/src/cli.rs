//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Accuracy;
use std::path::PathBuf;

/// geotrack - buffered location and log dispatch
#[derive(Parser, Debug)]
#[command(
    name = "geotrack",
    author,
    version,
    about = "Buffered location telemetry dispatch",
    long_about = "Collects location fixes, buffers them in durable queues and ships them to a \n\
                  remote collector in periodic batches, with an optional line-oriented \n\
                  log stream.\n\n\
                  `run` drives the pipeline from a simulated random-walk feed."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GEOTRACK_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GEOTRACK_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the tracking pipeline against a simulated feed
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "geotrack.toml", env = "GEOTRACK_CONFIG")]
    pub config: PathBuf,

    /// Override the collector URL from configuration
    #[arg(long, env = "GEOTRACK_COLLECTOR_URL")]
    pub collector_url: Option<String>,

    /// Override the accuracy class (high, medium, low)
    #[arg(long, env = "GEOTRACK_ACCURACY")]
    pub accuracy: Option<Accuracy>,

    /// Override the minimum spacing between admitted samples, in seconds
    #[arg(long, env = "GEOTRACK_SAMPLING_INTERVAL")]
    pub sampling_interval: Option<u64>,

    /// Override the batch transmission period, in seconds
    #[arg(long, env = "GEOTRACK_TRANSMISSION_INTERVAL")]
    pub transmission_interval: Option<u64>,

    /// Run duration in seconds (0 = until interrupted)
    #[arg(long, default_value = "0", env = "GEOTRACK_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "GEOTRACK_METRICS_PORT")]
    pub metrics_port: u16,

    /// Milliseconds between simulated fixes
    #[arg(long, default_value = "1000", env = "GEOTRACK_FIX_PERIOD_MS")]
    pub fix_period_ms: u64,

    /// Seed of the simulated random walk
    #[arg(long, default_value = "42", env = "GEOTRACK_SEED")]
    pub seed: u64,

    /// Seconds between heartbeat log lines (0 = disabled, needs a log stream)
    #[arg(long, default_value = "10", env = "GEOTRACK_HEARTBEAT")]
    pub heartbeat: u64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "geotrack.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "geotrack.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show collector header names (values are masked)
    #[arg(long)]
    pub headers: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_overrides_parse() {
        let cli = Cli::try_parse_from([
            "geotrack",
            "run",
            "--config",
            "tracker.toml",
            "--accuracy",
            "low",
            "--transmission-interval",
            "30",
            "--timeout",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("tracker.toml"));
                assert_eq!(args.accuracy, Some(Accuracy::Low));
                assert_eq!(args.transmission_interval, Some(30));
                assert_eq!(args.sampling_interval, None);
                assert_eq!(args.timeout, 5);
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_accuracy_rejected() {
        let result = Cli::try_parse_from(["geotrack", "run", "--accuracy", "extreme"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["geotrack", "-q", "-v", "validate"]);
        assert!(result.is_err());
    }
}
