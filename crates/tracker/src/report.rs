//! Status and run reports exposed by the service

use std::fmt;

use contracts::{DispatchSettings, FlushOutcome};
use observability::DispatchSummary;

/// Point-in-time view of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingStatus {
    pub tracking: bool,
    pub pending_locations: usize,
    pub pending_logs: usize,
    pub settings: DispatchSettings,
}

/// Result of an explicit `flush_now`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub locations: FlushOutcome,
    /// `None` when no log stream is configured
    pub logs: Option<FlushOutcome>,
}

/// Accumulated statistics since the service was created
#[derive(Debug, Clone, Default)]
pub struct TrackingReport {
    pub samples_received: u64,
    pub samples_admitted: u64,
    pub samples_filtered: u64,
    pub enqueue_failures: u64,
    pub locations: DispatchSummary,
    pub logs: Option<DispatchSummary>,
}

impl fmt::Display for TrackingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Ingestion ===")?;
        writeln!(
            f,
            "Received: {}  Admitted: {}  Filtered: {}",
            self.samples_received, self.samples_admitted, self.samples_filtered
        )?;
        if self.enqueue_failures > 0 {
            writeln!(f, "Enqueue failures: {}", self.enqueue_failures)?;
        }
        writeln!(f)?;
        writeln!(f, "=== Location dispatch ===")?;
        write!(f, "{}", self.locations)?;
        if let Some(logs) = &self.logs {
            writeln!(f)?;
            writeln!(f, "=== Log dispatch ===")?;
            write!(f, "{}", logs)?;
        }
        Ok(())
    }
}
