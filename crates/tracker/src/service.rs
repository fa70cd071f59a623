//! TrackingService - lifecycle and live configuration of the pipeline

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    BatchTransport, DispatchSettings, IdentityProvider, LocationSample, LogRecord, LogStreamConfig,
    RecordStore, SensorFeed, StorageConfig, StreamTransport, TrackerConfig, TrackerError,
};
use dispatcher::{parse_collector_url, BatchChannel, HttpBatchTransport, StreamChannel, TcpStreamTransport};
use durable_queue::DurableQueue;
use ingestion::{FeedSubscription, IngestionFilter};
use observability::DispatchMetricsAggregator;
use parking_lot::Mutex;
use scheduler::{PeriodicTask, Scheduler};
use tracing::{debug, info, instrument, warn};

use crate::report::{FlushReport, TrackingReport, TrackingStatus};

/// Scheduler name of the batch location cycle
pub const LOCATION_TASK: &str = "location-dispatch";

/// Scheduler name of the streaming log cycle
pub const LOG_TASK: &str = "log-dispatch";

const LOCATION_QUEUE: &str = "locations";
const LOG_QUEUE: &str = "logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceState {
    Stopped,
    Running,
}

struct LogPipeline<S> {
    config: LogStreamConfig,
    queue: Arc<DurableQueue<LogRecord>>,
    channel: Arc<StreamChannel<S>>,
    stats: Arc<Mutex<DispatchMetricsAggregator>>,
}

/// Tracking service
///
/// Owns both queues and channels. Must be used from within a tokio runtime
/// because starting the service spawns the scheduler's timer tasks.
pub struct TrackingService<B = HttpBatchTransport, S = TcpStreamTransport> {
    config: TrackerConfig,
    state: Mutex<ServiceState>,
    settings: Mutex<DispatchSettings>,
    log_flush_interval: Mutex<Option<Duration>>,
    feed: Arc<dyn SensorFeed>,
    identity: Arc<dyn IdentityProvider>,
    location_queue: Arc<DurableQueue<LocationSample>>,
    filter: Arc<IngestionFilter>,
    subscription: FeedSubscription,
    batch: Arc<BatchChannel<B>>,
    batch_stats: Arc<Mutex<DispatchMetricsAggregator>>,
    logs: Option<LogPipeline<S>>,
    scheduler: Scheduler,
}

impl TrackingService<HttpBatchTransport, TcpStreamTransport> {
    /// Service with the HTTP collector and TCP log stream from `config`
    #[instrument(name = "tracking_service_new", skip_all)]
    pub fn new(
        config: TrackerConfig,
        feed: Arc<dyn SensorFeed>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, TrackerError> {
        let batch_transport = HttpBatchTransport::new(&config.collector)?;
        let stream_transport = config
            .log_stream
            .as_ref()
            .map(|log_stream| TcpStreamTransport::new(&log_stream.address));

        Self::with_transports(config, feed, identity, batch_transport, stream_transport)
    }
}

impl<B, S> TrackingService<B, S>
where
    B: BatchTransport + Sync + 'static,
    S: StreamTransport + Sync + 'static,
{
    /// Service with caller-supplied transports
    ///
    /// `stream_transport` is ignored unless `config.log_stream` is set.
    pub fn with_transports(
        config: TrackerConfig,
        feed: Arc<dyn SensorFeed>,
        identity: Arc<dyn IdentityProvider>,
        batch_transport: B,
        stream_transport: Option<S>,
    ) -> Result<Self, TrackerError> {
        let settings = config.dispatch.settings();
        check_distinct_queues(&config)?;

        let location_queue = Arc::new(open_queue::<LocationSample>(
            LOCATION_QUEUE,
            &config.storage,
            |storage| storage.location_queue_path.as_deref(),
        ));
        let filter = Arc::new(
            IngestionFilter::new(location_queue.clone(), settings.sampling_interval)
                .with_queue_name(LOCATION_QUEUE),
        );
        let subscription = FeedSubscription::new(Arc::clone(&feed), Arc::clone(&filter), Arc::clone(&identity));
        let batch = Arc::new(BatchChannel::new(LOCATION_QUEUE, location_queue.clone(), batch_transport));

        let logs = match (config.log_stream.clone(), stream_transport) {
            (Some(log_config), Some(transport)) => {
                let queue = Arc::new(open_queue::<LogRecord>(LOG_QUEUE, &config.storage, |storage| {
                    storage.log_queue_path.as_deref()
                }));
                let channel = Arc::new(StreamChannel::new(LOG_QUEUE, queue.clone(), transport));
                Some(LogPipeline {
                    config: log_config,
                    queue,
                    channel,
                    stats: Arc::new(Mutex::new(DispatchMetricsAggregator::new())),
                })
            }
            (Some(_), None) => {
                return Err(TrackerError::invalid_configuration(
                    "log_stream",
                    "log stream configured without a stream transport",
                ));
            }
            (None, _) => None,
        };

        let log_flush_interval = logs.as_ref().map(|l| l.config.flush_interval());

        info!(
            collector = %config.collector.url,
            log_stream = logs.is_some(),
            persistent_locations = location_queue.is_persistent(),
            pending_locations = location_queue.count(),
            "tracking service created"
        );

        Ok(Self {
            config,
            state: Mutex::new(ServiceState::Stopped),
            settings: Mutex::new(settings),
            log_flush_interval: Mutex::new(log_flush_interval),
            feed,
            identity,
            location_queue,
            filter,
            subscription,
            batch,
            batch_stats: Arc::new(Mutex::new(DispatchMetricsAggregator::new())),
            logs,
            scheduler: Scheduler::new(),
        })
    }

    /// Validate configuration, subscribe the feed and schedule both channels
    ///
    /// Calling it while already tracking is a no-op.
    #[instrument(name = "tracking_start", skip(self))]
    pub fn start_tracking(&self) -> Result<(), TrackerError> {
        let mut state = self.state.lock();
        if *state == ServiceState::Running {
            debug!("already tracking");
            return Ok(());
        }

        self.check_destination()?;
        self.subscription.start()?;

        let settings = *self.settings.lock();
        self.feed.set_accuracy(settings.accuracy);
        self.filter.set_min_interval(settings.sampling_interval);

        if let Err(e) = self.schedule_channels(&settings) {
            self.scheduler.cancel_all();
            self.subscription.stop();
            return Err(e);
        }

        *state = ServiceState::Running;
        info!(
            accuracy = %settings.accuracy,
            sampling_interval = ?settings.sampling_interval,
            transmission_interval = ?settings.transmission_interval,
            "tracking started"
        );
        Ok(())
    }

    /// Cancel both cycles and the feed subscription; safe when never started
    ///
    /// Cycles already running finish normally.
    #[instrument(name = "tracking_stop", skip(self))]
    pub fn stop_tracking(&self) {
        let mut state = self.state.lock();
        if *state == ServiceState::Stopped {
            debug!("not tracking");
            return;
        }

        self.scheduler.cancel(LOCATION_TASK);
        self.scheduler.cancel(LOG_TASK);
        self.subscription.stop();

        *state = ServiceState::Stopped;
        info!(pending_locations = self.location_queue.count(), "tracking stopped");
    }

    pub fn is_tracking(&self) -> bool {
        *self.state.lock() == ServiceState::Running
    }

    pub fn settings(&self) -> DispatchSettings {
        *self.settings.lock()
    }

    pub fn set_accuracy(&self, accuracy: contracts::Accuracy) {
        let state = self.state.lock();
        self.settings.lock().accuracy = accuracy;
        if *state == ServiceState::Running {
            self.feed.set_accuracy(accuracy);
        }
        debug!(accuracy = %accuracy, "accuracy updated");
    }

    /// Minimum spacing between admitted samples; applies to the next fix
    pub fn set_sampling_interval(&self, interval: Duration) {
        self.settings.lock().sampling_interval = interval;
        self.filter.set_min_interval(interval);
    }

    /// Batch period; a running cycle is re-armed without stop/start
    pub fn set_transmission_interval(&self, interval: Duration) -> Result<(), TrackerError> {
        if interval.is_zero() {
            return Err(TrackerError::invalid_configuration(
                "transmission_interval",
                "must be greater than zero",
            ));
        }

        // Settings only change once the running cycle has accepted the period
        let state = self.state.lock();
        if *state == ServiceState::Running {
            self.scheduler.reschedule(LOCATION_TASK, interval)?;
        }
        self.settings.lock().transmission_interval = interval;
        info!(interval = ?interval, "transmission interval updated");
        Ok(())
    }

    /// Log stream period; requires a configured log stream
    pub fn set_log_flush_interval(&self, interval: Duration) -> Result<(), TrackerError> {
        if interval.is_zero() {
            return Err(TrackerError::invalid_configuration(
                "log_stream.flush_interval",
                "must be greater than zero",
            ));
        }
        if self.logs.is_none() {
            return Err(no_log_stream());
        }

        let state = self.state.lock();
        if *state == ServiceState::Running {
            self.scheduler.reschedule(LOG_TASK, interval)?;
        }
        *self.log_flush_interval.lock() = Some(interval);
        info!(interval = ?interval, "log flush interval updated");
        Ok(())
    }

    /// Queue a sample directly, bypassing the ingestion filter
    pub fn add(&self, sample: LocationSample) -> Result<(), TrackerError> {
        self.check_destination()?;
        self.location_queue.add(sample)
    }

    /// Queue samples directly, bypassing the ingestion filter
    pub fn add_all(&self, samples: Vec<LocationSample>) -> Result<(), TrackerError> {
        self.check_destination()?;
        self.location_queue.add_all(samples)
    }

    /// Queue one line for the log stream
    pub fn log(&self, line: impl Into<String>) -> Result<(), TrackerError> {
        let logs = self.logs.as_ref().ok_or_else(no_log_stream)?;
        logs.queue.add(LogRecord::new(&logs.config.token, line))
    }

    /// One-shot position from the feed, not queued
    pub fn fetch_current_location(&self) -> Result<LocationSample, TrackerError> {
        self.feed.authorization().check()?;
        let raw = self.feed.last_known().ok_or(TrackerError::NoLastKnownSample)?;
        Ok(LocationSample::from_raw(&raw, &self.identity.identity()))
    }

    /// Run one cycle of each channel now
    #[instrument(name = "tracking_flush_now", skip(self))]
    pub async fn flush_now(&self) -> FlushReport {
        let locations = run_batch_cycle(&self.batch, &self.batch_stats).await;
        let logs = match &self.logs {
            Some(logs) => Some(run_stream_cycle(&logs.channel, &logs.stats).await),
            None => None,
        };
        FlushReport { locations, logs }
    }

    pub fn status(&self) -> TrackingStatus {
        TrackingStatus {
            tracking: self.is_tracking(),
            pending_locations: self.location_queue.count(),
            pending_logs: self.logs.as_ref().map_or(0, |l| l.queue.count()),
            settings: self.settings(),
        }
    }

    /// Counters accumulated since creation
    pub fn report(&self) -> TrackingReport {
        let ingestion = self.filter.metrics().snapshot();
        TrackingReport {
            samples_received: ingestion.samples_received,
            samples_admitted: ingestion.samples_admitted,
            samples_filtered: ingestion.samples_filtered,
            enqueue_failures: ingestion.enqueue_failures,
            locations: self.batch_stats.lock().summary(),
            logs: self.logs.as_ref().map(|l| l.stats.lock().summary()),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn batch_channel(&self) -> &Arc<BatchChannel<B>> {
        &self.batch
    }

    pub fn stream_channel(&self) -> Option<&Arc<StreamChannel<S>>> {
        self.logs.as_ref().map(|l| &l.channel)
    }

    /// Whether the scheduler currently holds `task`
    pub fn is_scheduled(&self, task: &str) -> bool {
        self.scheduler.is_scheduled(task)
    }

    /// Current period of `task`, if scheduled
    pub fn scheduled_interval(&self, task: &str) -> Option<Duration> {
        self.scheduler.interval_of(task)
    }

    fn check_destination(&self) -> Result<(), TrackerError> {
        parse_collector_url(&self.config.collector.url)
            .map(|_| ())
            .map_err(|e| TrackerError::invalid_configuration("collector.url", e.to_string()))
    }

    fn schedule_channels(&self, settings: &DispatchSettings) -> Result<(), TrackerError> {
        let batch = Arc::clone(&self.batch);
        let batch_stats = Arc::clone(&self.batch_stats);
        self.scheduler.schedule(PeriodicTask::new(
            LOCATION_TASK,
            settings.transmission_interval,
            move || {
                let batch = Arc::clone(&batch);
                let stats = Arc::clone(&batch_stats);
                async move {
                    run_batch_cycle(&batch, &stats).await;
                }
            },
        ))?;

        if let Some(logs) = &self.logs {
            let interval = self
                .log_flush_interval
                .lock()
                .unwrap_or_else(|| logs.config.flush_interval());
            let channel = Arc::clone(&logs.channel);
            let stream_stats = Arc::clone(&logs.stats);
            self.scheduler.schedule(PeriodicTask::new(LOG_TASK, interval, move || {
                let channel = Arc::clone(&channel);
                let stats = Arc::clone(&stream_stats);
                async move {
                    run_stream_cycle(&channel, &stats).await;
                }
            }))?;
        }
        Ok(())
    }
}

impl<B, S> Drop for TrackingService<B, S> {
    fn drop(&mut self) {
        // The feed holds a callback into our filter
        self.subscription.stop();
    }
}

async fn run_batch_cycle<B>(
    channel: &BatchChannel<B>,
    stats: &Mutex<DispatchMetricsAggregator>,
) -> contracts::FlushOutcome
where
    B: BatchTransport + Sync,
{
    let outcome = channel.flush().await;
    stats.lock().update(&outcome);
    outcome
}

async fn run_stream_cycle<S>(
    channel: &StreamChannel<S>,
    stats: &Mutex<DispatchMetricsAggregator>,
) -> contracts::FlushOutcome
where
    S: StreamTransport + Sync,
{
    let outcome = channel.flush().await;
    stats.lock().update(&outcome);
    outcome
}

fn open_queue<T>(
    name: &str,
    storage: &StorageConfig,
    path: impl Fn(&StorageConfig) -> Option<&std::path::Path>,
) -> DurableQueue<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Send,
{
    match path(storage) {
        Some(path) => DurableQueue::open(name, path),
        None => {
            warn!(queue = %name, "no storage path configured, queue is in-memory only");
            DurableQueue::in_memory(name)
        }
    }
}

/// Both queues in one file would drain each other's records
fn check_distinct_queues(config: &TrackerConfig) -> Result<(), TrackerError> {
    if config.log_stream.is_none() {
        return Ok(());
    }
    match (&config.storage.location_queue_path, &config.storage.log_queue_path) {
        (Some(locations), Some(logs)) if locations == logs => Err(TrackerError::invalid_configuration(
            "storage.log_queue_path",
            format!("must differ from storage.location_queue_path ({})", locations.display()),
        )),
        _ => Ok(()),
    }
}

fn no_log_stream() -> TrackerError {
    TrackerError::invalid_configuration("log_stream", "no log stream configured")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use contracts::{
        Accuracy, BatchPayload, DeviceIdentity, RawPosition, SensorAuthorization, StaticIdentity,
        TransportError,
    };
    use ingestion::MockSensorFeed;
    use tokio::time::sleep;

    #[derive(Default)]
    struct RecordingBatch {
        posted: Mutex<Vec<BatchPayload>>,
    }

    impl BatchTransport for RecordingBatch {
        fn name(&self) -> &str {
            "recording"
        }

        async fn post(&self, payload: &BatchPayload) -> Result<(), TransportError> {
            self.posted.lock().push(payload.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingStream {
        written: Mutex<Vec<String>>,
    }

    impl StreamTransport for RecordingStream {
        fn name(&self) -> &str {
            "recording"
        }

        async fn write(&self, line: &str) -> Result<(), TransportError> {
            self.written.lock().push(line.to_string());
            Ok(())
        }
    }

    type TestService = TrackingService<RecordingBatch, RecordingStream>;

    fn config() -> TrackerConfig {
        TrackerConfig::with_collector_url("https://collector.example.com/v1/locations")
    }

    fn config_with_logs() -> TrackerConfig {
        let mut config = config();
        config.log_stream = Some(LogStreamConfig {
            address: "127.0.0.1:10000".to_string(),
            token: "tok".to_string(),
            flush_interval_secs: 5,
        });
        config
    }

    fn service_with(config: TrackerConfig, feed: Arc<MockSensorFeed>) -> TestService {
        let identity = Arc::new(StaticIdentity(DeviceIdentity {
            advertising_id: Some("ad-1".to_string()),
            limited_tracking: false,
        }));
        TrackingService::with_transports(
            config,
            feed,
            identity,
            RecordingBatch::default(),
            Some(RecordingStream::default()),
        )
        .unwrap()
    }

    fn sample_at(secs: i64) -> LocationSample {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        LocationSample::at(1.0, 2.0, base + TimeDelta::seconds(secs))
    }

    fn raw_at(secs: i64) -> RawPosition {
        let sample = sample_at(secs);
        RawPosition {
            latitude: sample.latitude,
            longitude: sample.longitude,
            horizontal_accuracy: 5.0,
            altitude: 0.0,
            speed: -1.0,
            course: -1.0,
            timestamp: sample.timestamp,
        }
    }

    #[tokio::test]
    async fn test_start_requires_destination() {
        let feed = Arc::new(MockSensorFeed::new());
        let service = service_with(TrackerConfig::with_collector_url(""), feed.clone());

        let err = service.start_tracking().unwrap_err();
        assert!(matches!(err, TrackerError::InvalidConfiguration { .. }));
        assert!(!service.is_tracking());
        assert!(!feed.is_subscribed());
    }

    #[tokio::test]
    async fn test_start_reports_authorization_errors() {
        let feed = Arc::new(MockSensorFeed::with_authorization(SensorAuthorization::Unauthorized));
        let service = service_with(config(), feed.clone());

        assert!(matches!(
            service.start_tracking(),
            Err(TrackerError::SensorUnauthorized)
        ));
        assert!(!service.is_tracking());
        assert!(!service.is_scheduled(LOCATION_TASK));
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stop_cancels() {
        let feed = Arc::new(MockSensorFeed::new());
        let service = service_with(config_with_logs(), feed.clone());

        service.start_tracking().unwrap();
        service.start_tracking().unwrap();
        assert!(service.is_tracking());
        assert!(feed.is_subscribed());
        assert!(service.is_scheduled(LOCATION_TASK));
        assert!(service.is_scheduled(LOG_TASK));

        service.stop_tracking();
        assert!(!service.is_tracking());
        assert!(!feed.is_subscribed());
        assert!(!service.is_scheduled(LOCATION_TASK));
        assert!(!service.is_scheduled(LOG_TASK));
    }

    #[tokio::test]
    async fn test_stop_without_start_is_safe() {
        let service = service_with(config(), Arc::new(MockSensorFeed::new()));
        service.stop_tracking();
        assert!(!service.is_tracking());
    }

    #[tokio::test]
    async fn test_add_bypasses_filter() {
        let service = service_with(config(), Arc::new(MockSensorFeed::new()));

        service.add(sample_at(0)).unwrap();
        service.add_all(vec![sample_at(1), sample_at(2)]).unwrap();

        assert_eq!(service.status().pending_locations, 3);
    }

    #[tokio::test]
    async fn test_add_without_destination_fails() {
        let service = service_with(
            TrackerConfig::with_collector_url("   "),
            Arc::new(MockSensorFeed::new()),
        );

        assert!(matches!(
            service.add(sample_at(0)),
            Err(TrackerError::InvalidConfiguration { .. })
        ));
        assert_eq!(service.status().pending_locations, 0);
    }

    #[tokio::test]
    async fn test_feed_samples_go_through_filter() {
        let feed = Arc::new(MockSensorFeed::new());
        let service = service_with(config(), feed.clone());
        service.start_tracking().unwrap();

        feed.emit(raw_at(0));
        feed.emit(raw_at(50));
        feed.emit(raw_at(130));

        assert_eq!(service.status().pending_locations, 2);
        assert_eq!(service.report().samples_filtered, 1);
    }

    #[tokio::test]
    async fn test_sampling_interval_applies_to_next_fix() {
        let feed = Arc::new(MockSensorFeed::new());
        let service = service_with(config(), feed.clone());
        service.start_tracking().unwrap();

        feed.emit(raw_at(0));
        feed.emit(raw_at(10));
        assert_eq!(service.status().pending_locations, 1);

        service.set_sampling_interval(Duration::from_secs(5));
        feed.emit(raw_at(20));
        assert_eq!(service.status().pending_locations, 2);
        assert_eq!(service.settings().sampling_interval, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_log_requires_stream() {
        let service = service_with(config(), Arc::new(MockSensorFeed::new()));
        assert!(matches!(
            service.log("hello"),
            Err(TrackerError::InvalidConfiguration { .. })
        ));
        assert!(service.set_log_flush_interval(Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_flush_now_delivers_both_channels() {
        let service = service_with(config_with_logs(), Arc::new(MockSensorFeed::new()));
        service.add(sample_at(0)).unwrap();
        service.log("first line").unwrap();
        assert_eq!(service.status().pending_logs, 1);

        let report = service.flush_now().await;

        assert_eq!(report.locations.delivered, 1);
        assert_eq!(report.logs.map(|o| o.delivered), Some(1));
        let written = service.stream_channel().unwrap().transport().written.lock().clone();
        assert_eq!(written, vec!["tok first line\n".to_string()]);
        assert_eq!(service.report().locations.total_delivered, 1);
    }

    #[tokio::test]
    async fn test_fetch_current_location() {
        let feed = Arc::new(MockSensorFeed::new());
        let service = service_with(config(), feed.clone());

        assert!(matches!(
            service.fetch_current_location(),
            Err(TrackerError::NoLastKnownSample)
        ));

        feed.emit(raw_at(0));
        let sample = service.fetch_current_location().unwrap();
        assert_eq!(sample.advertising_id.as_deref(), Some("ad-1"));
        assert_eq!(service.status().pending_locations, 0);

        feed.set_authorization(SensorAuthorization::Disabled);
        assert!(matches!(
            service.fetch_current_location(),
            Err(TrackerError::SensorDisabled)
        ));
    }

    #[tokio::test]
    async fn test_settings_apply_to_feed_while_running() {
        let feed = Arc::new(MockSensorFeed::new());
        let service = service_with(config(), feed.clone());

        service.set_accuracy(Accuracy::Low);
        assert_eq!(feed.accuracy(), Accuracy::High);

        service.start_tracking().unwrap();
        assert_eq!(feed.accuracy(), Accuracy::Low);

        service.set_accuracy(Accuracy::Medium);
        assert_eq!(feed.accuracy(), Accuracy::Medium);
        assert_eq!(service.settings().accuracy, Accuracy::Medium);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transmission_interval_rearms_while_running() {
        let service = service_with(config(), Arc::new(MockSensorFeed::new()));
        service.start_tracking().unwrap();
        service.add(sample_at(0)).unwrap();

        service.set_transmission_interval(Duration::from_secs(10)).unwrap();
        assert!(service.is_tracking());
        assert_eq!(
            service.scheduled_interval(LOCATION_TASK),
            Some(Duration::from_secs(10))
        );

        sleep(Duration::from_secs(11)).await;
        assert_eq!(service.batch_channel().transport().posted.lock().len(), 1);
        assert_eq!(service.status().pending_locations, 0);
    }

    #[tokio::test]
    async fn test_interval_changes_are_remembered_while_stopped() {
        let service = service_with(config(), Arc::new(MockSensorFeed::new()));

        service.set_transmission_interval(Duration::from_secs(42)).unwrap();
        assert!(!service.is_scheduled(LOCATION_TASK));

        service.start_tracking().unwrap();
        assert_eq!(
            service.scheduled_interval(LOCATION_TASK),
            Some(Duration::from_secs(42))
        );
    }

    #[tokio::test]
    async fn test_zero_transmission_interval_rejected() {
        let service = service_with(config(), Arc::new(MockSensorFeed::new()));
        assert!(service.set_transmission_interval(Duration::ZERO).is_err());
        assert_eq!(
            service.settings().transmission_interval,
            Duration::from_secs(contracts::DEFAULT_TRANSMISSION_INTERVAL_SECS)
        );
    }

    #[tokio::test]
    async fn test_sqlite_queue_survives_service_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.storage = StorageConfig {
            location_queue_path: Some(dir.path().join("locations.db")),
            log_queue_path: None,
        };

        {
            let service = service_with(config.clone(), Arc::new(MockSensorFeed::new()));
            service.add_all(vec![sample_at(0), sample_at(1)]).unwrap();
        }

        let service = service_with(config, Arc::new(MockSensorFeed::new()));
        assert_eq!(service.status().pending_locations, 2);
    }

    #[tokio::test]
    async fn test_shared_queue_path_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("queue.db");
        let mut config = config_with_logs();
        config.storage = StorageConfig {
            location_queue_path: Some(shared.clone()),
            log_queue_path: Some(shared),
        };

        let result = TrackingService::with_transports(
            config,
            Arc::new(MockSensorFeed::new()),
            Arc::new(StaticIdentity(DeviceIdentity::default())),
            RecordingBatch::default(),
            Some(RecordingStream::default()),
        );
        assert!(matches!(
            result.err(),
            Some(TrackerError::InvalidConfiguration { field, .. }) if field == "storage.log_queue_path"
        ));
    }

    #[tokio::test]
    async fn test_distinct_queue_paths_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_logs();
        config.storage = StorageConfig {
            location_queue_path: Some(dir.path().join("locations.db")),
            log_queue_path: Some(dir.path().join("logs.db")),
        };

        let service = service_with(config, Arc::new(MockSensorFeed::new()));
        service.add(sample_at(0)).unwrap();
        service.log("boot").unwrap();
        assert_eq!(service.status().pending_locations, 1);
    }

    #[tokio::test]
    async fn test_failed_reschedule_keeps_previous_interval() {
        let service = service_with(config_with_logs(), Arc::new(MockSensorFeed::new()));
        service.start_tracking().unwrap();
        let before = service.settings().transmission_interval;

        service.scheduler.cancel(LOCATION_TASK);
        assert!(service.set_transmission_interval(Duration::from_secs(10)).is_err());
        assert_eq!(service.settings().transmission_interval, before);

        let log_before = *service.log_flush_interval.lock();
        service.scheduler.cancel(LOG_TASK);
        assert!(service.set_log_flush_interval(Duration::from_secs(3)).is_err());
        assert_eq!(*service.log_flush_interval.lock(), log_before);
    }
}
