//! IngestionFilter - minimum-interval gate in front of the location queue

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use contracts::{LocationSample, RecordStore};
use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::error::IngestionError;
use crate::metrics::IngestionMetrics;

/// Whether `sample` is far enough from the last admitted one
///
/// Rejects iff `last_admitted.timestamp + min_interval > sample.timestamp`.
/// With nothing admitted yet every sample passes.
pub fn admit(
    sample: &LocationSample,
    last_admitted: Option<&LocationSample>,
    min_interval: Duration,
) -> bool {
    let Some(last) = last_admitted else {
        return true;
    };

    let gap = TimeDelta::from_std(min_interval).unwrap_or(TimeDelta::MAX);
    match last.timestamp.checked_add_signed(gap) {
        Some(earliest) => earliest <= sample.timestamp,
        // Interval reaches past the representable range
        None => false,
    }
}

struct FilterState {
    last_admitted: Option<LocationSample>,
    min_interval: Duration,
}

/// Ingestion filter
///
/// Admitted samples go straight into the location queue. The last-admitted
/// pointer moves on admission even if the queue write then fails, so a
/// failing store does not turn the filter into a pass-through.
pub struct IngestionFilter {
    queue: Arc<dyn RecordStore<LocationSample>>,
    queue_name: String,
    state: Mutex<FilterState>,
    metrics: Arc<IngestionMetrics>,
}

impl IngestionFilter {
    pub fn new(queue: Arc<dyn RecordStore<LocationSample>>, min_interval: Duration) -> Self {
        Self {
            queue,
            queue_name: "locations".to_string(),
            state: Mutex::new(FilterState {
                last_admitted: None,
                min_interval,
            }),
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Name used in logs/metrics for the target queue
    pub fn with_queue_name(mut self, name: impl Into<String>) -> Self {
        self.queue_name = name.into();
        self
    }

    /// Offer a sample; returns whether the filter admitted it
    pub fn offer(&self, sample: LocationSample) -> bool {
        self.metrics.record_received();

        // The pointer and the queue advance together, so admission order is queue order
        let mut state = self.state.lock();
        if !admit(&sample, state.last_admitted.as_ref(), state.min_interval) {
            trace!(timestamp = %sample.timestamp, "sample inside minimum interval, dropped");
            self.metrics.record_filtered();
            return false;
        }
        state.last_admitted = Some(sample.clone());
        self.metrics.record_admitted();

        if let Err(e) = self.enqueue(sample) {
            error!(queue = %self.queue_name, error = %e, "admitted sample dropped");
            self.metrics.record_enqueue_failure(&self.queue_name);
        }
        drop(state);
        true
    }

    fn enqueue(&self, sample: LocationSample) -> Result<(), IngestionError> {
        self.queue
            .add(sample)
            .map_err(|e| IngestionError::enqueue(e.to_string()))
    }

    /// Change the minimum interval; applies to the next offer
    pub fn set_min_interval(&self, min_interval: Duration) {
        debug!(min_interval = ?min_interval, "ingestion interval updated");
        self.state.lock().min_interval = min_interval;
    }

    pub fn min_interval(&self) -> Duration {
        self.state.lock().min_interval
    }

    pub fn last_admitted(&self) -> Option<LocationSample> {
        self.state.lock().last_admitted.clone()
    }

    pub fn metrics(&self) -> &Arc<IngestionMetrics> {
        &self.metrics
    }
}
