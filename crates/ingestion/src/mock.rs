//! Mock sensor feed
//!
//! Scriptable `SensorFeed` for tests and demo runs without a location device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use contracts::{Accuracy, PositionCallback, RawPosition, SensorAuthorization, SensorFeed};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Random-walk generator configuration
#[derive(Debug, Clone)]
pub struct RandomWalkConfig {
    /// Starting latitude (degrees)
    pub origin_latitude: f64,

    /// Starting longitude (degrees)
    pub origin_longitude: f64,

    /// Maximum displacement per fix (degrees)
    pub max_step_degrees: f64,

    /// Time between fixes
    pub period: Duration,

    /// RNG seed, fixed for reproducible runs
    pub seed: u64,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            origin_latitude: 52.520008,
            origin_longitude: 13.404954,
            max_step_degrees: 0.0005,
            period: Duration::from_secs(1),
            seed: 42,
        }
    }
}

/// Mock sensor feed
///
/// Positions are pushed with `emit` or produced by a background random walk.
/// Every emitted position becomes the feed's last known fix.
pub struct MockSensorFeed {
    authorization: Mutex<SensorAuthorization>,
    callback: Mutex<Option<PositionCallback>>,
    accuracy: Mutex<Accuracy>,
    last_known: Mutex<Option<RawPosition>>,
    running: Arc<AtomicBool>,
}

impl Default for MockSensorFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSensorFeed {
    /// Authorized feed with no fix yet
    pub fn new() -> Self {
        Self::with_authorization(SensorAuthorization::Authorized)
    }

    pub fn with_authorization(authorization: SensorAuthorization) -> Self {
        Self {
            authorization: Mutex::new(authorization),
            callback: Mutex::new(None),
            accuracy: Mutex::new(Accuracy::default()),
            last_known: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_authorization(&self, authorization: SensorAuthorization) {
        *self.authorization.lock() = authorization;
    }

    /// Accuracy most recently requested by the consumer
    pub fn accuracy(&self) -> Accuracy {
        *self.accuracy.lock()
    }

    /// Deliver a position; returns whether a subscriber received it
    pub fn emit(&self, position: RawPosition) -> bool {
        *self.last_known.lock() = Some(position);

        // Clone out so the callback runs without holding the lock
        let callback = self.callback.lock().clone();
        match callback {
            Some(callback) => {
                callback(position);
                true
            }
            None => false,
        }
    }

    /// Start emitting a seeded random walk every `config.period`
    pub fn start_random_walk(self: &Arc<Self>, config: RandomWalkConfig) -> JoinHandle<()> {
        let feed = Arc::clone(self);
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(config.seed);
            let mut latitude = config.origin_latitude;
            let mut longitude = config.origin_longitude;
            let mut emitted: u64 = 0;

            debug!(
                period = ?config.period,
                seed = config.seed,
                "mock random walk started"
            );

            loop {
                tokio::time::sleep(config.period).await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }

                let step = config.max_step_degrees;
                latitude = (latitude + rng.random_range(-step..=step)).clamp(-90.0, 90.0);
                longitude = wrap_longitude(longitude + rng.random_range(-step..=step));

                let position = RawPosition {
                    latitude,
                    longitude,
                    horizontal_accuracy: feed.accuracy().desired_meters(),
                    altitude: 30.0 + rng.random_range(-2.0..=2.0),
                    speed: rng.random_range(0.0..=2.0),
                    course: rng.random_range(0.0..360.0),
                    timestamp: Utc::now(),
                };
                feed.emit(position);
                emitted += 1;

                trace!(emitted, latitude, longitude, "mock fix emitted");
            }

            debug!(emitted, "mock random walk stopped");
        })
    }

    pub fn stop_random_walk(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_walking(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

fn wrap_longitude(longitude: f64) -> f64 {
    if longitude > 180.0 {
        longitude - 360.0
    } else if longitude < -180.0 {
        longitude + 360.0
    } else {
        longitude
    }
}

impl SensorFeed for MockSensorFeed {
    fn authorization(&self) -> SensorAuthorization {
        *self.authorization.lock()
    }

    fn subscribe(&self, callback: PositionCallback) {
        *self.callback.lock() = Some(callback);
    }

    fn cancel(&self) {
        self.callback.lock().take();
    }

    fn is_subscribed(&self) -> bool {
        self.callback.lock().is_some()
    }

    fn set_accuracy(&self, accuracy: Accuracy) {
        debug!(accuracy = %accuracy, "mock feed accuracy changed");
        *self.accuracy.lock() = accuracy;
    }

    fn last_known(&self) -> Option<RawPosition> {
        *self.last_known.lock()
    }
}
