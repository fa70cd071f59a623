//! Production transports

mod http;
mod tcp;

pub use http::{parse_collector_url, HttpBatchTransport};
pub use tcp::TcpStreamTransport;
