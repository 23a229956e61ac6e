//! Bounded error-history log.
//!
//! Write-only telemetry: every translated failure is appended here so a
//! support session can read the last few errors back out of the durable
//! store. The log is capped at the ten most recent records, oldest evicted
//! first. Appends are best-effort; a failure to persist telemetry must never
//! mask the error being reported.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::SessionStore;

/// Key under which the error log is persisted.
pub const ERROR_LOG_KEY: &str = "app_errors";

/// Maximum number of records retained.
pub const MAX_ERROR_RECORDS: usize = 10;

/// One recorded failure, tagged with client context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The resolved, human-readable message.
    pub message: String,
    /// HTTP status, or a negative pseudo-status for non-HTTP failures.
    pub status: i32,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
    /// The request URL, when the failure came off the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Field-level validation errors reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
    /// The client identification string in effect when the failure occurred.
    pub user_agent: String,
}

/// The bounded log, riding in an injected [`SessionStore`].
pub struct ErrorHistory {
    store: Arc<dyn SessionStore>,
}

impl ErrorHistory {
    /// Create a history over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Append a record, evicting the oldest when the cap is reached.
    ///
    /// Persistence failures are logged as warnings and swallowed.
    pub fn append(&self, record: ErrorRecord) {
        if let Err(e) = self.try_append(record) {
            tracing::warn!(error = %e, "failed to persist error record");
        }
    }

    fn try_append(&self, record: ErrorRecord) -> Result<()> {
        let mut records = self.records();
        records.push(record);
        if records.len() > MAX_ERROR_RECORDS {
            let excess = records.len() - MAX_ERROR_RECORDS;
            records.drain(..excess);
        }

        let raw = serde_json::to_string(&records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(ERROR_LOG_KEY, &raw)
    }

    /// Read the current records. Unreadable history reads as empty.
    #[must_use]
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.store
            .get(ERROR_LOG_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Drop all records.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(ERROR_LOG_KEY) {
            tracing::warn!(error = %e, "failed to clear error history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn record(message: &str, status: i32) -> ErrorRecord {
        ErrorRecord {
            message: message.to_string(),
            status,
            timestamp: Utc::now(),
            url: None,
            errors: None,
            user_agent: "test-agent".to_string(),
        }
    }

    #[test]
    fn appends_and_reads_back() {
        let history = ErrorHistory::new(Arc::new(MemoryStore::default()));
        history.append(record("first", 500));
        history.append(record("second", 404));

        let records = history.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].status, 404);
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let history = ErrorHistory::new(Arc::new(MemoryStore::default()));
        for i in 0..12 {
            history.append(record(&format!("err-{i}"), 500));
        }

        let records = history.records();
        assert_eq!(records.len(), MAX_ERROR_RECORDS);
        assert_eq!(records[0].message, "err-2");
        assert_eq!(records[9].message, "err-11");
    }

    #[test]
    fn persists_under_well_known_key() {
        let store = Arc::new(MemoryStore::default());
        let history = ErrorHistory::new(store.clone());
        history.append(record("boom", -1));

        let raw = store.get(ERROR_LOG_KEY).unwrap();
        let parsed: Vec<ErrorRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0].message, "boom");
        assert_eq!(parsed[0].status, -1);
    }

    #[test]
    fn corrupt_history_reads_empty_and_recovers() {
        let store = Arc::new(MemoryStore::default());
        store.set(ERROR_LOG_KEY, "not json").unwrap();

        let history = ErrorHistory::new(store);
        assert!(history.records().is_empty());

        history.append(record("fresh", 400));
        assert_eq!(history.records().len(), 1);
    }

    #[test]
    fn clear_drops_records() {
        let history = ErrorHistory::new(Arc::new(MemoryStore::default()));
        history.append(record("gone", 500));
        history.clear();
        assert!(history.records().is_empty());
    }
}
