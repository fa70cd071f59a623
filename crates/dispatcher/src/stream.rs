//! StreamChannel - one write per log record, per-record requeue

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use contracts::{FlushOutcome, LogRecord, RecordStore, StreamTransport};
use tracing::{debug, error, instrument, warn};

use crate::error::DispatcherError;
use crate::in_flight::InFlight;
use crate::metrics::ChannelMetrics;

/// Streaming dispatch channel
///
/// Records are written in drained order. Successful ones are discarded, the
/// failed ones go back to the queue in their original relative order.
pub struct StreamChannel<T> {
    name: String,
    queue: Arc<dyn RecordStore<LogRecord>>,
    transport: T,
    in_flight: AtomicBool,
    metrics: Arc<ChannelMetrics>,
}

impl<T> StreamChannel<T>
where
    T: StreamTransport + Sync,
{
    pub fn new(name: impl Into<String>, queue: Arc<dyn RecordStore<LogRecord>>, transport: T) -> Self {
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

    pub fn pending(&self) -> usize {
        self.queue.count()
    }

    /// Run one dispatch cycle
    #[instrument(name = "stream_channel_flush", skip(self), fields(channel = %self.name))]
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

        let mut outcome = FlushOutcome {
            drained: drained.len(),
            ..Default::default()
        };
        let mut failed = Vec::new();

        for record in drained {
            match self.transport.write(&record.wire_line()).await {
                Ok(()) => {
                    outcome.delivered += 1;
                    observability::record_stream_write(&self.name, true);
                }
                Err(e) => {
                    self.metrics.inc_transport_failures();
                    observability::record_stream_write(&self.name, false);
                    warn!(
                        channel = %self.name,
                        transport = %self.transport.name(),
                        error = %e,
                        "log write failed, record kept"
                    );
                    failed.push(record);
                }
            }
        }

        if !failed.is_empty() {
            let count = failed.len();
            match self.queue.add_all(failed) {
                Ok(()) => outcome.requeued = count,
                Err(e) => {
                    error!(
                        channel = %self.name,
                        error = %e,
                        records = count,
                        "requeue failed, records lost"
                    );
                    outcome.lost = count;
                }
            }
        }

        debug!(
            channel = %self.name,
            delivered = outcome.delivered,
            requeued = outcome.requeued,
            "stream cycle complete"
        );
        outcome
    }

    fn drain(&self) -> Result<Vec<LogRecord>, DispatcherError> {
        self.queue
            .pop_all()
            .map_err(|e| DispatcherError::queue(&self.name, e))
    }
}
