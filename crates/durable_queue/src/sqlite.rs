//! SQLite-backed record storage
//!
//! Records are stored as JSON text; the `INTEGER PRIMARY KEY AUTOINCREMENT`
//! column is the opaque insertion index that gives the queue its order.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::QueueError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    body TEXT NOT NULL
);
";

/// Raw storage; callers hold the queue lock around every call
pub(crate) struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub(crate) fn open(path: &Path) -> Result<Self, QueueError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| QueueError::open(path, format!("create directory: {e}")))?;
        }

        let conn = Connection::open(path).map_err(|e| QueueError::open(path, e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| QueueError::open(path, e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| QueueError::open(path, e.to_string()))?;

        debug!(path = %path.display(), "sqlite queue opened");
        Ok(Self { conn })
    }

    /// Insert encoded records in one transaction
    pub(crate) fn insert(&mut self, bodies: &[String]) -> Result<(), QueueError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached("INSERT INTO records (body) VALUES (?1)")?;
            for body in bodies {
                stmt.execute(params![body])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Read every row in insertion order and delete exactly those rows
    pub(crate) fn take_all(&mut self) -> Result<Vec<String>, QueueError> {
        let tx = self.conn.transaction()?;
        let rows = {
            let mut stmt = tx.prepare_cached("SELECT id, body FROM records ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        if let Some((max_id, _)) = rows.last() {
            tx.execute("DELETE FROM records WHERE id <= ?1", params![max_id])?;
        }
        tx.commit()?;

        Ok(rows.into_iter().map(|(_, body)| body).collect())
    }

    pub(crate) fn count(&self) -> Result<usize, QueueError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}
