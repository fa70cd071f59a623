//! # Tracker
//!
//! `TrackingService` ties the pipeline together: sensor feed subscription,
//! ingestion filter, the two durable queues, both dispatch channels and the
//! scheduler that fires them.
//!
//! ## Usage Example
//!
//! ```ignore
//! let service = TrackingService::new(config, feed, identity)?;
//! service.start_tracking()?;
//! service.set_transmission_interval(Duration::from_secs(60))?;
//! // ...
//! service.stop_tracking();
//! service.flush_now().await;
//! ```

mod report;
mod service;

pub use report::{FlushReport, TrackingReport, TrackingStatus};
pub use service::{TrackingService, LOCATION_TASK, LOG_TASK};
