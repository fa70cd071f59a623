//! RecordStore trait - the queue contract seen by ingestion and dispatch

use crate::TrackerError;

/// Ordered store of pending records
///
/// Implementations must serialize all four operations against each other so
/// that `pop_all` is an exact partition of what was added: a record is either
/// in the returned batch or still stored, never both and never neither.
pub trait RecordStore<T>: Send + Sync {
    /// Append one record
    fn add(&self, record: T) -> Result<(), TrackerError>;

    /// Append records preserving their order
    fn add_all(&self, records: Vec<T>) -> Result<(), TrackerError>;

    /// Atomically return every stored record (insertion order) and clear
    fn pop_all(&self) -> Result<Vec<T>, TrackerError>;

    /// Advisory live record count
    fn count(&self) -> usize;
}
