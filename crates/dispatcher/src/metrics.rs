//! Channel metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::FlushOutcome;

/// Metrics for a single dispatch channel
#[derive(Debug, Default)]
pub struct ChannelMetrics {
    /// Cycles that drained at least one record
    cycles: AtomicU64,
    /// Cycles skipped by the in-flight guard
    skipped: AtomicU64,
    /// Records acknowledged by the transport
    delivered: AtomicU64,
    /// Records put back after a failure
    requeued: AtomicU64,
    /// Records that could not be put back
    lost: AtomicU64,
    /// Failed transport calls
    transport_failures: AtomicU64,
}

impl ChannelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cycle into the counters
    pub fn record(&self, outcome: &FlushOutcome) {
        if outcome.skipped {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if outcome.is_idle() {
            return;
        }
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(outcome.delivered as u64, Ordering::Relaxed);
        self.requeued
            .fetch_add(outcome.requeued as u64, Ordering::Relaxed);
        self.lost.fetch_add(outcome.lost as u64, Ordering::Relaxed);
    }

    pub fn inc_transport_failures(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            requeued: self.requeued.load(Ordering::Relaxed),
            lost: self.lost.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of channel metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub skipped: u64,
    pub delivered: u64,
    pub requeued: u64,
    pub lost: u64,
    pub transport_failures: u64,
}
