//! Pipeline orchestrator - wires a simulated feed into the tracking service.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{DeviceIdentity, StaticIdentity, TrackerConfig};
use ingestion::{MockSensorFeed, RandomWalkConfig};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracker::TrackingService;

use super::PipelineStats;
use crate::error::{CliError, Result};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated tracker configuration
    pub tracker: TrackerConfig,

    /// Run duration (None = until shutdown)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Simulated feed
    pub walk: RandomWalkConfig,

    /// Heartbeat log period (None = disabled)
    pub heartbeat: Option<Duration>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves or the timeout elapses, then flush once
    pub async fn run<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)
                .map_err(|e| CliError::metrics(port, e.to_string()))?;
            info!("Metrics endpoint available on port {}", port);
        }

        let feed = Arc::new(MockSensorFeed::new());
        let identity = Arc::new(StaticIdentity(DeviceIdentity {
            advertising_id: Some(format!("demo-{:016x}", self.config.walk.seed)),
            limited_tracking: false,
        }));

        let service = TrackingService::new(self.config.tracker.clone(), feed.clone(), identity)?;
        service.start_tracking()?;

        info!(
            collector = %self.config.tracker.collector.url,
            log_stream = self.config.tracker.log_stream.is_some(),
            fix_period_ms = self.config.walk.period.as_millis() as u64,
            "Tracking started (simulated feed)"
        );

        let walker = feed.start_random_walk(self.config.walk.clone());
        let heartbeat = self
            .config
            .heartbeat
            .filter(|_| self.config.tracker.log_stream.is_some());

        self.wait(&service, heartbeat, shutdown).await;

        info!("Shutting down pipeline...");
        feed.stop_random_walk();
        walker.abort();
        service.stop_tracking();

        let final_flush = service.flush_now().await;
        let status = service.status();

        if status.pending_locations > 0 || status.pending_logs > 0 {
            warn!(
                pending_locations = status.pending_locations,
                pending_logs = status.pending_logs,
                "Records left undelivered after final flush"
            );
        }

        let stats = PipelineStats {
            duration: start_time.elapsed(),
            report: service.report(),
            final_flush,
            pending_locations: status.pending_locations,
            pending_logs: status.pending_logs,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            delivered = stats.report.locations.total_delivered,
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    async fn wait<F>(&self, service: &TrackingService, heartbeat: Option<Duration>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        let mut ticker = heartbeat.map(|period| {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping pipeline...");
                    return;
                }
                _ = &mut deadline => {
                    info!("Run duration elapsed");
                    return;
                }
                _ = tick(&mut ticker) => emit_heartbeat(service),
            }
        }
    }
}

async fn tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn emit_heartbeat(service: &TrackingService) {
    let status = service.status();
    let position = match service.fetch_current_location() {
        Ok(sample) => format!("lat={:.6} lon={:.6}", sample.latitude, sample.longitude),
        Err(e) => {
            debug!(error = %e, "no position for heartbeat");
            "lat=? lon=?".to_string()
        }
    };
    let line = format!(
        "heartbeat {} pending_locations={} accuracy={}",
        position, status.pending_locations, status.settings.accuracy
    );
    if let Err(e) = service.log(line) {
        warn!(error = %e, "heartbeat log line dropped");
    }
}
