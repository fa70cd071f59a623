//! HttpBatchTransport - JSON POST of one batch per cycle

use std::collections::BTreeMap;

use contracts::{BatchPayload, BatchTransport, CollectorConfig, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use crate::error::DispatcherError;

/// Posts `{"locations": [...]}` to the collector
///
/// URL and headers are parsed per request, so a bad destination shows up as
/// a failed (requeued) cycle instead of a construction error.
pub struct HttpBatchTransport {
    name: String,
    url: String,
    headers: BTreeMap<String, String>,
    client: Client,
}

impl HttpBatchTransport {
    #[instrument(name = "http_transport_new", skip(config), fields(url = %config.url))]
    pub fn new(config: &CollectorConfig) -> Result<Self, DispatcherError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DispatcherError::transport_creation("http", e.to_string()))?;

        Ok(Self {
            name: "http".to_string(),
            url: config.url.clone(),
            headers: config.headers.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn destination(&self) -> Result<(Url, HeaderMap), TransportError> {
        let url = parse_collector_url(&self.url)?;

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                TransportError::malformed_destination(&self.url, format!("header '{key}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransportError::malformed_destination(&self.url, format!("header '{key}': {e}"))
            })?;
            headers.insert(name, value);
        }
        Ok((url, headers))
    }
}

/// Parse a collector URL, accepting only absolute http(s) URLs
pub fn parse_collector_url(url: &str) -> Result<Url, TransportError> {
    if url.trim().is_empty() {
        return Err(TransportError::malformed_destination(url, "destination is empty"));
    }
    let parsed =
        Url::parse(url).map_err(|e| TransportError::malformed_destination(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(TransportError::malformed_destination(
            url,
            format!("unsupported scheme '{other}'"),
        )),
    }
}

impl BatchTransport for HttpBatchTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn post(&self, payload: &BatchPayload) -> Result<(), TransportError> {
        let (url, headers) = self.destination()?;

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        // a truncated body means the collector never finished acknowledging
        response
            .bytes()
            .await
            .map_err(|e| TransportError::MalformedResponse {
                message: e.to_string(),
            })?;

        debug!(status = status.as_u16(), records = payload.len(), "collector accepted batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::LocationSample;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn collector(url: String) -> CollectorConfig {
        CollectorConfig {
            url,
            headers: BTreeMap::from([("x-api-key".to_string(), "secret".to_string())]),
            timeout_secs: Some(5),
        }
    }

    fn payload() -> BatchPayload {
        BatchPayload::new(vec![LocationSample::at(1.0, 2.0, Utc::now())])
    }

    /// Accept one request, answer with `status`, return the raw request text
    async fn serve_once(listener: TcpListener, status: &'static str) -> String {
        let response = format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        serve_raw(listener, response).await
    }

    /// Accept one request, write `response` verbatim and hang up
    async fn serve_raw(listener: TcpListener, response: String) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        key.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_post_sends_json_and_headers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/locations", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "200 OK"));

        let transport = HttpBatchTransport::new(&collector(url)).unwrap();
        transport.post(&payload()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /locations"));
        assert!(request.to_ascii_lowercase().contains("x-api-key: secret"));
        assert!(request.contains("\"locations\":["));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "503 Service Unavailable"));

        let transport = HttpBatchTransport::new(&collector(url)).unwrap();
        let err = transport.post(&payload()).await.unwrap_err();

        assert_eq!(err, TransportError::Status { status: 503 });
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_truncated_body_is_malformed_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let response =
            "HTTP/1.1 200 OK\r\ncontent-length: 64\r\nconnection: close\r\n\r\n{\"ok\"".to_string();
        let server = tokio::spawn(serve_raw(listener, response));

        let transport = HttpBatchTransport::new(&collector(url)).unwrap();
        let err = transport.post(&payload()).await.unwrap_err();

        assert!(matches!(err, TransportError::MalformedResponse { .. }));
        assert!(!err.is_permanent());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unparseable_url_is_malformed_destination() {
        let transport = HttpBatchTransport::new(&collector("not a url".to_string())).unwrap();
        let err = transport.post(&payload()).await.unwrap_err();
        assert!(err.is_permanent());
    }

    #[test]
    fn test_parse_collector_url() {
        assert!(parse_collector_url("https://collector.example.com/v1/locations").is_ok());
        assert!(parse_collector_url("").is_err());
        assert!(parse_collector_url("   ").is_err());
        assert!(parse_collector_url("ftp://example.com").is_err());
        assert!(parse_collector_url("/relative/path").is_err());
    }

    #[tokio::test]
    async fn test_bad_header_is_malformed_destination() {
        let mut config = collector("http://127.0.0.1:9/".to_string());
        config.headers.insert("bad header".to_string(), "v".to_string());

        let transport = HttpBatchTransport::new(&config).unwrap();
        let err = transport.post(&payload()).await.unwrap_err();
        assert!(matches!(err, TransportError::MalformedDestination { .. }));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let transport = HttpBatchTransport::new(&collector(url)).unwrap();
        let err = transport.post(&payload()).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection { .. }));
    }
}
