//! Ingestion counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Samples offered to the filter
    pub samples_received: AtomicU64,

    /// Samples admitted by the filter
    pub samples_admitted: AtomicU64,

    /// Samples rejected as too close to the previous one
    pub samples_filtered: AtomicU64,

    /// Admitted samples lost because the queue write failed
    pub enqueue_failures: AtomicU64,
}

impl IngestionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.samples_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_admitted(&self) {
        self.samples_admitted.fetch_add(1, Ordering::Relaxed);
        observability::record_sample_admitted();
    }

    pub fn record_filtered(&self) {
        self.samples_filtered.fetch_add(1, Ordering::Relaxed);
        observability::record_sample_filtered();
    }

    pub fn record_enqueue_failure(&self, queue: &str) {
        self.enqueue_failures.fetch_add(1, Ordering::Relaxed);
        observability::record_enqueue_failure(queue);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_received: self.samples_received.load(Ordering::Relaxed),
            samples_admitted: self.samples_admitted.load(Ordering::Relaxed),
            samples_filtered: self.samples_filtered.load(Ordering::Relaxed),
            enqueue_failures: self.enqueue_failures.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub samples_received: u64,
    pub samples_admitted: u64,
    pub samples_filtered: u64,
    pub enqueue_failures: u64,
}
