//! DurableQueue - mutex-serialized record queue with persistent or volatile backend

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use contracts::{RecordStore, TrackerError};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::error::QueueError;
use crate::sqlite::SqliteStore;

enum Backend<T> {
    Sqlite(SqliteStore),
    Memory(VecDeque<T>),
}

/// Ordered record queue
///
/// Every operation takes the same lock, so a drain is an exact partition of
/// what has been added: concurrent `add` calls land either in the returned
/// batch or in the queue for the next drain.
pub struct DurableQueue<T> {
    name: String,
    backend: Mutex<Backend<T>>,
    /// Live count maintained under the lock
    len: AtomicUsize,
}

impl<T> fmt::Debug for DurableQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurableQueue")
            .field("name", &self.name)
            .field("persistent", &self.is_persistent())
            .field("len", &self.len.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T> DurableQueue<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    /// Open a persistent queue, falling back to memory on failure
    ///
    /// The fallback is logged and counted but never fatal.
    #[instrument(name = "durable_queue_open", skip(name, path), fields(queue = %name.as_ref(), path = %path.as_ref().display()))]
    pub fn open(name: impl AsRef<str>, path: impl AsRef<Path>) -> Self {
        match Self::try_open(name.as_ref(), path.as_ref()) {
            Ok(queue) => queue,
            Err(e) => {
                warn!(
                    queue = %name.as_ref(),
                    error = %e,
                    "persistent queue unavailable, falling back to in-memory queue"
                );
                observability::record_storage_fallback(name.as_ref());
                Self::in_memory(name.as_ref())
            }
        }
    }

    /// Open a persistent queue, reporting failure to the caller
    pub fn try_open(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let store = SqliteStore::open(path.as_ref())?;
        let existing = store.count()?;
        let name = name.into();

        if existing > 0 {
            debug!(queue = %name, records = existing, "recovered pending records");
        }
        observability::record_queue_depth(&name, existing);

        Ok(Self {
            name,
            backend: Mutex::new(Backend::Sqlite(store)),
            len: AtomicUsize::new(existing),
        })
    }

    /// Volatile queue (lost on restart)
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: Mutex::new(Backend::Memory(VecDeque::new())),
            len: AtomicUsize::new(0),
        }
    }
}

impl<T> DurableQueue<T> {
    /// Queue name (used for logging/metrics)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether records survive a process restart
    pub fn is_persistent(&self) -> bool {
        matches!(*self.backend.lock(), Backend::Sqlite(_))
    }

    fn publish_len(&self, len: usize) {
        self.len.store(len, Ordering::Relaxed);
        observability::record_queue_depth(&self.name, len);
    }
}

impl<T> DurableQueue<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    fn append(&self, records: Vec<T>) -> Result<(), QueueError> {
        if records.is_empty() {
            return Ok(());
        }

        // Both backends accept exactly the records the persistent one can give back
        let bodies = records
            .iter()
            .map(encode_checked)
            .collect::<Result<Vec<_>, _>>()?;

        let added = records.len();
        let mut backend = self.backend.lock();
        match &mut *backend {
            Backend::Sqlite(store) => store.insert(&bodies)?,
            Backend::Memory(items) => items.extend(records),
        }
        self.publish_len(self.len.load(Ordering::Relaxed) + added);
        Ok(())
    }

    fn drain(&self) -> Result<Vec<T>, QueueError> {
        let bodies = {
            let mut backend = self.backend.lock();
            let bodies = match &mut *backend {
                Backend::Sqlite(store) => store.take_all()?,
                Backend::Memory(items) => {
                    let records: Vec<T> = items.drain(..).collect();
                    self.publish_len(0);
                    return Ok(records);
                }
            };
            self.publish_len(0);
            bodies
        };

        // Decoding happens outside the lock
        let mut records = Vec::with_capacity(bodies.len());
        for body in bodies {
            match serde_json::from_str(&body) {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!(queue = %self.name, error = %e, "discarding undecodable record");
                    observability::record_corrupt_record(&self.name);
                }
            }
        }
        Ok(records)
    }
}

/// Encode one record, refusing anything that would not survive a drain
///
/// serde_json writes non-finite floats as `null`, which then fails to decode
/// into the numeric field it came from.
fn encode_checked<T>(record: &T) -> Result<String, QueueError>
where
    T: Serialize + DeserializeOwned,
{
    let body = serde_json::to_string(record)?;
    serde_json::from_str::<T>(&body).map_err(|e| QueueError::Unrepresentable {
        message: e.to_string(),
    })?;
    Ok(body)
}

impl<T> RecordStore<T> for DurableQueue<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    fn add(&self, record: T) -> Result<(), TrackerError> {
        self.append(vec![record]).map_err(TrackerError::from)
    }

    fn add_all(&self, records: Vec<T>) -> Result<(), TrackerError> {
        self.append(records).map_err(TrackerError::from)
    }

    fn pop_all(&self) -> Result<Vec<T>, TrackerError> {
        self.drain().map_err(TrackerError::from)
    }

    fn count(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }
}
