//! # Durable Queue
//!
//! At-least-once buffer between ingestion and dispatch.
//!
//! Two interchangeable backends sit behind one [`DurableQueue`]:
//! - SQLite file (survives process restart)
//! - in-memory `VecDeque` (fallback when the file cannot be opened)
//!
//! The backend is chosen once in [`DurableQueue::open`] and is invisible to
//! callers, which only see the `RecordStore` contract.
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::RecordStore;
//! use durable_queue::DurableQueue;
//!
//! let queue: DurableQueue<LocationSample> = DurableQueue::open("locations", "/var/lib/geotrack/locations.db");
//! queue.add(sample)?;
//! let drained = queue.pop_all()?;
//! ```

mod error;
mod queue;
mod sqlite;

pub use error::QueueError;
pub use queue::DurableQueue;
