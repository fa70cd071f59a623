//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! - wire format snapshots
//! - feed -> filter -> queue -> HTTP collector over a local socket
//! - log stream over a local TCP listener
//! - queue persistence across service restarts

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use chrono::{TimeDelta, TimeZone, Utc};
    use contracts::RawPosition;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    pub fn raw_at(secs: i64, latitude: f64) -> RawPosition {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        RawPosition {
            latitude,
            longitude: 13.4,
            horizontal_accuracy: 8.0,
            altitude: 35.0,
            speed: 1.2,
            course: 180.0,
            timestamp: base + TimeDelta::seconds(secs),
        }
    }

    /// Minimal HTTP collector: answers each request with the next scripted
    /// status (200 once the script runs out) and keeps the request bodies.
    pub struct Collector {
        pub url: String,
        pub bodies: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    impl Collector {
        pub async fn start(statuses: Vec<&'static str>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}/v1/locations", listener.local_addr().unwrap());
            let bodies = Arc::new(Mutex::new(Vec::new()));
            let recorded = bodies.clone();

            tokio::spawn(async move {
                let mut statuses = statuses.into_iter();
                loop {
                    let Ok((mut socket, _)) = listener.accept().await else {
                        return;
                    };
                    let body = read_request_body(&mut socket).await;
                    let status = statuses.next().unwrap_or("200 OK");
                    if status.starts_with("200") {
                        recorded
                            .lock()
                            .await
                            .push(serde_json::from_slice(&body).unwrap());
                    }
                    let response = format!(
                        "HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                }
            });

            Self { url, bodies }
        }

        /// Latitudes of every accepted batch, in arrival order
        pub async fn latitudes(&self) -> Vec<Vec<f64>> {
            self.bodies
                .lock()
                .await
                .iter()
                .map(|body| {
                    body["locations"]
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|l| l["latitude"].as_f64().unwrap())
                        .collect()
                })
                .collect()
        }
    }

    async fn read_request_body(socket: &mut tokio::net::TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return Vec::new();
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(header_end) = find_header_end(&buf) else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let body_start = header_end + 4;
            if buf.len() >= body_start + content_length {
                return buf[body_start..body_start + content_length].to_vec();
            }
        }
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }
}

#[cfg(test)]
mod contract_tests {
    use chrono::{TimeZone, Utc};
    use contracts::{BatchPayload, DeviceIdentity, LocationSample, LogRecord};

    #[test]
    fn test_batch_payload_wire_shape() {
        let identity = DeviceIdentity {
            advertising_id: Some("ad-7".to_string()),
            limited_tracking: true,
        };
        let sample = LocationSample::from_raw(&crate::support::raw_at(0, 52.5), &identity);
        let json = serde_json::to_value(BatchPayload::new(vec![sample])).unwrap();

        let location = &json["locations"][0];
        assert_eq!(location["latitude"], 52.5);
        assert_eq!(location["advertising_id"], "ad-7");
        assert_eq!(location["limited_tracking"], true);
        assert_eq!(location["timestamp"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_sample_without_identity_omits_advertising_id() {
        let sample = LocationSample::at(1.0, 2.0, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let json = serde_json::to_value(&sample).unwrap();
        assert!(json.get("advertising_id").is_none());
    }

    #[test]
    fn test_log_wire_line() {
        assert_eq!(
            LogRecord::new("acct-1", "engine started").wire_line(),
            "acct-1 engine started\n"
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        DeviceIdentity, LocationSample, LogStreamConfig, StaticIdentity, StorageConfig,
        TrackerConfig,
    };
    use ingestion::MockSensorFeed;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;
    use tracker::TrackingService;

    use crate::support::{raw_at, Collector};

    fn identity() -> Arc<StaticIdentity> {
        Arc::new(StaticIdentity(DeviceIdentity {
            advertising_id: Some("ad-e2e".to_string()),
            limited_tracking: false,
        }))
    }

    /// MockSensorFeed -> IngestionFilter -> queue -> HttpBatchTransport
    #[tokio::test]
    async fn test_e2e_feed_to_collector() {
        let collector = Collector::start(vec![]).await;
        let feed = Arc::new(MockSensorFeed::new());
        let service =
            TrackingService::new(TrackerConfig::with_collector_url(&collector.url), feed.clone(), identity())
                .unwrap();

        service.start_tracking().unwrap();
        // 120s default spacing: 0 and 130 pass, 50 is filtered
        feed.emit(raw_at(0, 1.0));
        feed.emit(raw_at(50, 2.0));
        feed.emit(raw_at(130, 3.0));

        let report = service.flush_now().await;

        assert_eq!(report.locations.delivered, 2);
        assert_eq!(collector.latitudes().await, vec![vec![1.0, 3.0]]);
        assert_eq!(
            collector.bodies.lock().await[0]["locations"][0]["advertising_id"],
            "ad-e2e"
        );
        assert_eq!(service.status().pending_locations, 0);
        assert_eq!(service.report().samples_filtered, 1);
    }

    #[tokio::test]
    async fn test_e2e_failed_post_requeues_until_collector_recovers() {
        let collector = Collector::start(vec!["503 Service Unavailable"]).await;
        let service = TrackingService::new(
            TrackerConfig::with_collector_url(&collector.url),
            Arc::new(MockSensorFeed::new()),
            identity(),
        )
        .unwrap();

        let base = raw_at(0, 0.0).timestamp;
        service
            .add_all(
                (1..=3)
                    .map(|i| LocationSample::at(i as f64, 0.0, base))
                    .collect(),
            )
            .unwrap();

        let first = service.flush_now().await;
        assert_eq!(first.locations.requeued, 3);
        assert_eq!(service.status().pending_locations, 3);
        assert!(collector.latitudes().await.is_empty());

        service.add(LocationSample::at(4.0, 0.0, base)).unwrap();
        let second = service.flush_now().await;

        assert_eq!(second.locations.delivered, 4);
        assert_eq!(collector.latitudes().await, vec![vec![1.0, 2.0, 3.0, 4.0]]);

        let summary = service.report().locations;
        assert_eq!(summary.total_requeued, 3);
        assert_eq!(summary.total_delivered, 4);
    }

    #[tokio::test]
    async fn test_e2e_log_stream_over_tcp() {
        let collector = Collector::start(vec![]).await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut lines = BufReader::new(socket).lines();
            let mut received = Vec::new();
            while received.len() < 2 {
                match lines.next_line().await.unwrap() {
                    Some(line) => received.push(line),
                    None => break,
                }
            }
            received
        });

        let mut config = TrackerConfig::with_collector_url(&collector.url);
        config.log_stream = Some(LogStreamConfig {
            address,
            token: "acct-9".to_string(),
            flush_interval_secs: 5,
        });
        let service = TrackingService::new(config, Arc::new(MockSensorFeed::new()), identity()).unwrap();

        service.log("engine started").unwrap();
        service.log("fix acquired").unwrap();
        let report = service.flush_now().await;

        assert_eq!(report.logs.map(|o| o.delivered), Some(2));
        assert!(report.locations.is_idle());
        let received = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, vec!["acct-9 engine started", "acct-9 fix acquired"]);
    }

    #[tokio::test]
    async fn test_e2e_unreachable_log_stream_keeps_lines() {
        let collector = Collector::start(vec![]).await;
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut config = TrackerConfig::with_collector_url(&collector.url);
        config.log_stream = Some(LogStreamConfig {
            address,
            token: "acct-9".to_string(),
            flush_interval_secs: 5,
        });
        let service = TrackingService::new(config, Arc::new(MockSensorFeed::new()), identity()).unwrap();

        service.log("one").unwrap();
        service.log("two").unwrap();
        let report = service.flush_now().await;

        assert_eq!(report.logs.map(|o| o.requeued), Some(2));
        assert_eq!(service.status().pending_logs, 2);
    }

    #[tokio::test]
    async fn test_e2e_persisted_samples_delivered_after_restart() {
        let collector = Collector::start(vec![]).await;
        let dir = tempfile::tempdir().unwrap();
        let mut config = TrackerConfig::with_collector_url(&collector.url);
        config.storage = StorageConfig {
            location_queue_path: Some(dir.path().join("locations.db")),
            log_queue_path: None,
        };

        let base = raw_at(0, 0.0).timestamp;
        {
            let service =
                TrackingService::new(config.clone(), Arc::new(MockSensorFeed::new()), identity())
                    .unwrap();
            service
                .add_all(vec![
                    LocationSample::at(10.0, 0.0, base),
                    LocationSample::at(11.0, 0.0, base),
                ])
                .unwrap();
        }

        let service = TrackingService::new(config, Arc::new(MockSensorFeed::new()), identity()).unwrap();
        assert_eq!(service.status().pending_locations, 2);

        service.flush_now().await;
        assert_eq!(collector.latitudes().await, vec![vec![10.0, 11.0]]);
        assert_eq!(service.status().pending_locations, 0);
    }

    #[tokio::test]
    async fn test_e2e_loaded_config_drives_service() {
        let collector = Collector::start(vec![]).await;
        let content = format!(
            r#"
            [collector]
            url = "{}"
            timeout_secs = 5

            [dispatch]
            accuracy = "medium"
            sampling_interval_secs = 0
            transmission_interval_secs = 60
            "#,
            collector.url
        );
        let config = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();

        let feed = Arc::new(MockSensorFeed::new());
        let service = TrackingService::new(config, feed.clone(), identity()).unwrap();
        service.start_tracking().unwrap();

        assert_eq!(feed.accuracy(), contracts::Accuracy::Medium);
        assert_eq!(
            service.scheduled_interval(tracker::LOCATION_TASK),
            Some(Duration::from_secs(60))
        );

        // Zero spacing admits every fix
        feed.emit(raw_at(0, 1.0));
        feed.emit(raw_at(1, 2.0));
        assert_eq!(service.status().pending_locations, 2);

        service.stop_tracking();
        service.flush_now().await;
        assert_eq!(collector.latitudes().await, vec![vec![1.0, 2.0]]);
    }
}
