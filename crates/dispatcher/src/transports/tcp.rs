//! TcpStreamTransport - persistent line-oriented TCP connection

use std::io;

use contracts::{StreamTransport, TransportError};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Writes wire lines over one lazily opened TCP connection
///
/// A failed write drops the connection; the next write reconnects.
pub struct TcpStreamTransport {
    name: String,
    address: String,
    stream: Mutex<Option<TcpStream>>,
}

impl TcpStreamTransport {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: "tcp".to_string(),
            address: address.into(),
            stream: Mutex::new(None),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether a connection is currently open
    pub async fn is_connected(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    async fn connect(&self) -> Result<TcpStream, TransportError> {
        let stream = TcpStream::connect(&self.address)
            .await
            .map_err(|e| connect_error(&self.address, e))?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(address = %self.address, error = %e, "could not disable nagle");
        }
        info!(address = %self.address, "log stream connected");
        Ok(stream)
    }
}

fn connect_error(address: &str, e: io::Error) -> TransportError {
    match e.kind() {
        io::ErrorKind::InvalidInput => TransportError::malformed_destination(address, e.to_string()),
        _ => TransportError::connection(e.to_string()),
    }
}

impl StreamTransport for TcpStreamTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&self, line: &str) -> Result<(), TransportError> {
        let mut slot = self.stream.lock().await;

        let mut stream = match slot.take() {
            Some(stream) => stream,
            None => self.connect().await?,
        };

        match stream.write_all(line.as_bytes()).await {
            Ok(()) => {
                *slot = Some(stream);
                Ok(())
            }
            Err(e) => {
                warn!(address = %self.address, error = %e, "log stream write failed, dropping connection");
                Err(TransportError::connection(e.to_string()))
            }
        }
    }
}
