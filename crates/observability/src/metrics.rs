//! Pipeline metrics
//!
//! Thin wrappers over the `metrics` facade so every crate records the same
//! names and labels, plus an in-process aggregator for run summaries.

use contracts::FlushOutcome;
use metrics::{counter, gauge, histogram};

/// Sample passed the ingestion filter
pub fn record_sample_admitted() {
    counter!("geotrack_samples_admitted_total").increment(1);
}

/// Sample arrived too soon after the last admitted one
pub fn record_sample_filtered() {
    counter!("geotrack_samples_filtered_total").increment(1);
}

/// Admitted record could not be written to its queue
pub fn record_enqueue_failure(queue: &str) {
    counter!("geotrack_enqueue_failures_total", "queue" => queue.to_string()).increment(1);
}

/// Current queue depth
pub fn record_queue_depth(queue: &str, depth: usize) {
    gauge!("geotrack_queue_depth", "queue" => queue.to_string()).set(depth as f64);
}

/// Persistent storage could not be opened, memory queue in use
pub fn record_storage_fallback(queue: &str) {
    counter!("geotrack_storage_fallbacks_total", "queue" => queue.to_string()).increment(1);
}

/// Stored record could not be decoded and was discarded
pub fn record_corrupt_record(queue: &str) {
    counter!("geotrack_corrupt_records_total", "queue" => queue.to_string()).increment(1);
}

/// Cycle skipped because the previous one is still in flight
pub fn record_flush_skipped(channel: &str) {
    counter!("geotrack_flush_skipped_total", "channel" => channel.to_string()).increment(1);
}

/// Single streamed write
pub fn record_stream_write(channel: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "geotrack_stream_writes_total",
        "channel" => channel.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Outcome of one dispatch cycle
pub fn record_flush_outcome(channel: &str, outcome: &FlushOutcome) {
    if outcome.skipped {
        record_flush_skipped(channel);
        return;
    }
    if outcome.is_idle() {
        return;
    }

    counter!("geotrack_flush_cycles_total", "channel" => channel.to_string()).increment(1);
    histogram!("geotrack_flush_batch_size", "channel" => channel.to_string())
        .record(outcome.drained as f64);

    if outcome.delivered > 0 {
        counter!("geotrack_records_delivered_total", "channel" => channel.to_string())
            .increment(outcome.delivered as u64);
    }
    if outcome.requeued > 0 {
        counter!("geotrack_records_requeued_total", "channel" => channel.to_string())
            .increment(outcome.requeued as u64);
    }
    if outcome.lost > 0 {
        counter!("geotrack_records_lost_total", "channel" => channel.to_string())
            .increment(outcome.lost as u64);
    }
}

/// Dispatch metrics aggregator
///
/// Aggregates flush outcomes in memory for end-of-run summaries.
#[derive(Debug, Clone, Default)]
pub struct DispatchMetricsAggregator {
    /// Cycles that drained at least one record
    pub cycles: u64,

    /// Cycles skipped by the in-flight guard
    pub skipped_cycles: u64,

    pub total_delivered: u64,
    pub total_requeued: u64,
    pub total_lost: u64,

    /// Drained records per cycle
    pub batch_stats: RunningStats,
}

impl DispatchMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, outcome: &FlushOutcome) {
        if outcome.skipped {
            self.skipped_cycles += 1;
            return;
        }
        if outcome.is_idle() {
            return;
        }

        self.cycles += 1;
        self.total_delivered += outcome.delivered as u64;
        self.total_requeued += outcome.requeued as u64;
        self.total_lost += outcome.lost as u64;
        self.batch_stats.push(outcome.drained as f64);
    }

    pub fn summary(&self) -> DispatchSummary {
        let attempted = self.total_delivered + self.total_requeued + self.total_lost;
        DispatchSummary {
            cycles: self.cycles,
            skipped_cycles: self.skipped_cycles,
            total_delivered: self.total_delivered,
            total_requeued: self.total_requeued,
            total_lost: self.total_lost,
            failure_rate: if attempted > 0 {
                (self.total_requeued + self.total_lost) as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_stats),
        }
    }
}

/// Dispatch summary
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub cycles: u64,
    pub skipped_cycles: u64,
    pub total_delivered: u64,
    pub total_requeued: u64,
    pub total_lost: u64,
    pub failure_rate: f64,
    pub batch_size: StatsSummary,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cycles: {} (skipped {})", self.cycles, self.skipped_cycles)?;
        writeln!(f, "Delivered: {}", self.total_delivered)?;
        writeln!(
            f,
            "Requeued: {} ({:.2}% of attempts failed)",
            self.total_requeued, self.failure_rate
        )?;
        if self.total_lost > 0 {
            writeln!(f, "Lost: {}", self.total_lost)?;
        }
        writeln!(f, "Batch size: {}", self.batch_size)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
