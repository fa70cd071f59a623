//! BatchChannel - whole-queue batch delivery with all-or-nothing requeue

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use contracts::{BatchPayload, BatchTransport, FlushOutcome, LocationSample, RecordStore};
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatcherError;
use crate::in_flight::InFlight;
use crate::metrics::ChannelMetrics;

/// Batch dispatch channel
///
/// Each `flush` drains the location queue and posts it as one payload. Any
/// transport failure puts every drained record back, so delivery is
/// at-least-once.
pub struct BatchChannel<T> {
    name: String,
    queue: Arc<dyn RecordStore<LocationSample>>,
    transport: T,
    in_flight: AtomicBool,
    metrics: Arc<ChannelMetrics>,
}

impl<T> BatchChannel<T>
where
    T: BatchTransport + Sync,
{
    pub fn new(
        name: impl Into<String>,
        queue: Arc<dyn RecordStore<LocationSample>>,
        transport: T,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            transport,
            in_flight: AtomicBool::new(false),
            metrics: Arc::new(ChannelMetrics::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn metrics(&self) -> &Arc<ChannelMetrics> {
        &self.metrics
    }

    /// Records waiting for the next cycle
    pub fn pending(&self) -> usize {
        self.queue.count()
    }

    /// Run one dispatch cycle
    #[instrument(name = "batch_channel_flush", skip(self), fields(channel = %self.name))]
    pub async fn flush(&self) -> FlushOutcome {
        let outcome = match InFlight::try_acquire(&self.in_flight) {
            Some(_guard) => self.run_cycle().await,
            None => {
                debug!(channel = %self.name, "previous cycle still in flight, skipping");
                FlushOutcome::skipped()
            }
        };

        self.metrics.record(&outcome);
        observability::record_flush_outcome(&self.name, &outcome);
        outcome
    }

    async fn run_cycle(&self) -> FlushOutcome {
        let drained = match self.drain() {
            Ok(records) => records,
            Err(e) => {
                error!(channel = %self.name, error = %e, "drain failed, cycle aborted");
                return FlushOutcome::empty();
            }
        };
        if drained.is_empty() {
            return FlushOutcome::empty();
        }

        let count = drained.len();
        let payload = BatchPayload::new(drained);

        match self.transport.post(&payload).await {
            Ok(()) => {
                info!(
                    channel = %self.name,
                    transport = %self.transport.name(),
                    records = count,
                    "batch delivered"
                );
                FlushOutcome {
                    drained: count,
                    delivered: count,
                    ..Default::default()
                }
            }
            Err(e) => {
                self.metrics.inc_transport_failures();
                if e.is_permanent() {
                    error!(
                        channel = %self.name,
                        error = %e,
                        records = count,
                        "destination is malformed, batch requeued"
                    );
                } else {
                    warn!(
                        channel = %self.name,
                        error = %e,
                        records = count,
                        "batch delivery failed, requeueing"
                    );
                }
                self.requeue(payload.into_locations())
            }
        }
    }

    fn drain(&self) -> Result<Vec<LocationSample>, DispatcherError> {
        self.queue
            .pop_all()
            .map_err(|e| DispatcherError::queue(&self.name, e))
    }

    fn requeue(&self, records: Vec<LocationSample>) -> FlushOutcome {
        let count = records.len();
        match self.queue.add_all(records) {
            Ok(()) => FlushOutcome {
                drained: count,
                requeued: count,
                ..Default::default()
            },
            Err(e) => {
                error!(
                    channel = %self.name,
                    error = %e,
                    records = count,
                    "requeue failed, records lost"
                );
                FlushOutcome {
                    drained: count,
                    lost: count,
                    ..Default::default()
                }
            }
        }
    }
}
