//! Pipeline statistics.

use std::time::Duration;

use tracker::{FlushReport, TrackingReport};

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Wall time of the run
    pub duration: Duration,

    /// Service counters accumulated over the run
    pub report: TrackingReport,

    /// Outcome of the flush issued at shutdown
    pub final_flush: FlushReport,

    /// Records still queued after the final flush
    pub pending_locations: usize,
    pub pending_logs: usize,
}

impl PipelineStats {
    /// Admitted samples per second
    pub fn admission_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.report.samples_admitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of received samples dropped by the sampling interval, as a percentage
    pub fn filter_rate(&self) -> f64 {
        if self.report.samples_received > 0 {
            (self.report.samples_filtered as f64 / self.report.samples_received as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Run Statistics ===\n");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Admitted per second: {:.3}", self.admission_rate());
        println!("Filtered: {:.1}%", self.filter_rate());
        println!();
        print!("{}", self.report);

        println!("\n=== Final flush ===");
        let locations = &self.final_flush.locations;
        println!(
            "Locations: delivered {} requeued {} lost {}",
            locations.delivered, locations.requeued, locations.lost
        );
        if let Some(logs) = &self.final_flush.logs {
            println!(
                "Logs: delivered {} requeued {} lost {}",
                logs.delivered, logs.requeued, logs.lost
            );
        }
        if self.pending_locations > 0 || self.pending_logs > 0 {
            println!(
                "Still queued: {} locations, {} logs",
                self.pending_locations, self.pending_logs
            );
        }
        println!();
    }
}
