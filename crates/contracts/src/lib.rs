//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! record types that travel through the pipeline, the collaborator traits
//! (sensor feed, record store, transports) and the unified error type.
//! Business crates depend on this crate only, never on each other's internals.
//!
//! ## Time Model
//! - Capture timestamps are wall-clock UTC (`chrono::DateTime<Utc>`)
//! - Intervals (sampling, transmission, flush) are `std::time::Duration`

mod config;
mod error;
mod location;
mod log_record;
mod outcome;
mod sensor_feed;
mod settings;
mod store;
mod transport;

pub use config::*;
pub use error::*;
pub use location::*;
pub use log_record::LogRecord;
pub use outcome::FlushOutcome;
pub use sensor_feed::{IdentityProvider, PositionCallback, SensorAuthorization, SensorFeed, StaticIdentity};
pub use settings::*;
pub use store::RecordStore;
pub use transport::*;
