//! # Dispatcher
//!
//! Queue-draining delivery channels.
//!
//! - `BatchChannel`: drains the location queue into one POST per cycle,
//!   requeues the whole batch on any failure
//! - `StreamChannel`: drains the log queue and writes records one by one,
//!   requeues only the records that failed
//! - Both skip a cycle while the previous one of the same channel is in flight
//!
//! Transports are traits (`contracts::BatchTransport`,
//! `contracts::StreamTransport`); `HttpBatchTransport` and `TcpStreamTransport`
//! are the production implementations.

pub mod batch;
pub mod error;
mod in_flight;
pub mod metrics;
pub mod stream;
pub mod transports;

pub use batch::BatchChannel;
pub use contracts::{BatchTransport, FlushOutcome, StreamTransport};
pub use error::DispatcherError;
pub use metrics::{ChannelMetrics, MetricsSnapshot};
pub use stream::StreamChannel;
pub use transports::{parse_collector_url, HttpBatchTransport, TcpStreamTransport};
