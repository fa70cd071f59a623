//! Transport traits - Dispatcher output interfaces

use crate::{BatchPayload, TransportError};

/// Batch transport
///
/// One call per dispatch cycle. `Ok` is authoritative for discarding the
/// batch, `Err` for requeueing it.
#[trait_variant::make(BatchTransport: Send)]
pub trait LocalBatchTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Post one batch to the collector
    async fn post(&self, payload: &BatchPayload) -> Result<(), TransportError>;
}

/// Streaming transport
///
/// One call per log record.
#[trait_variant::make(StreamTransport: Send)]
pub trait LocalStreamTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one complete wire line
    async fn write(&self, line: &str) -> Result<(), TransportError>;
}
