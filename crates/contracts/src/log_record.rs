//! LogRecord - one line for the streaming channel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const LINE_SEPARATOR: char = '\u{2028}';

/// Log record
///
/// Wraps a pre-formatted line plus the account token needed to rebuild the
/// wire line after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub line: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(token: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            token: token.into(),
            created_at: Utc::now(),
        }
    }

    /// Line as written to the stream: `"{token} {line}\n"`
    ///
    /// Embedded newlines become U+2028 so one record is one wire line.
    pub fn wire_line(&self) -> String {
        let body: String = self
            .line
            .chars()
            .map(|c| if c == '\n' || c == '\r' { LINE_SEPARATOR } else { c })
            .collect();
        format!("{} {}\n", self.token, body)
    }
}
