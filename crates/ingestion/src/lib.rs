//! # Ingestion
//!
//! Sensor feed to location queue.
//!
//! Responsibilities:
//! - Rate-limit raw fixes by capture time (`IngestionFilter`)
//! - Enrich fixes with the cached device identity (`FeedSubscription`)
//! - Provide a scriptable feed for tests and demo runs (`MockSensorFeed`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{FeedSubscription, IngestionFilter};
//!
//! let filter = Arc::new(IngestionFilter::new(queue, Duration::from_secs(120)));
//! let subscription = FeedSubscription::new(feed, Arc::clone(&filter), identity);
//! subscription.start()?;
//! // ...
//! subscription.stop();
//! ```

mod error;
mod filter;
mod metrics;
mod mock;
mod subscription;

pub use error::{IngestionError, Result};
pub use filter::{admit, IngestionFilter};
pub use metrics::{IngestionMetrics, MetricsSnapshot};
pub use mock::{MockSensorFeed, RandomWalkConfig};
pub use subscription::FeedSubscription;
