//! File-backed session store.
//!
//! Plays the role the browser cookie jar played for the original system: a
//! small durable key/value document where every entry carries its own expiry.
//! Entries default to a three-day retention window; an expired entry is
//! reported as absent on read and dropped on the next write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::SessionStore;

/// Default retention for stored entries.
const DEFAULT_RETENTION_DAYS: i64 = 3;

/// A single stored value with its expiry instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// A `SessionStore` persisted as a JSON document on disk.
pub struct FileStore {
    path: PathBuf,
    retention: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl FileStore {
    /// Open a store at the given path, loading any existing document.
    ///
    /// A corrupt document is logged and treated as empty rather than
    /// refusing to open: losing a stale token pair is recoverable, a client
    /// that cannot start is not.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt session file, starting empty");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
            entries: RwLock::new(entries),
        })
    }

    /// Override the retention window applied to subsequent writes.
    #[must_use]
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Write the current entries back to disk, dropping expired ones.
    fn flush(&self, entries: &mut HashMap<String, Entry>) -> Result<()> {
        let now = Utc::now();
        entries.retain(|_, entry| entry.expires_at > now);

        let raw = serde_json::to_string(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.expires_at <= Utc::now() {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Utc::now() + self.retention,
            },
        );
        self.flush(&mut entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.remove(key);
        self.flush(&mut entries)
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write();
        entries.clear();
        self.flush(&mut entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set("access_token", "abc").unwrap();
            store.set("refresh_token", "def").unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("access_token").as_deref(), Some("abc"));
        assert_eq!(store.get("refresh_token").as_deref(), Some("def"));
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path)
            .unwrap()
            .with_retention(Duration::zero());
        store.set("access_token", "abc").unwrap();
        assert!(store.get("access_token").is_none());
    }

    #[test]
    fn expired_entries_are_dropped_on_next_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path)
            .unwrap()
            .with_retention(Duration::zero());
        store.set("stale", "x").unwrap();

        let store = store.with_retention(Duration::days(3));
        store.set("fresh", "y").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get("stale").is_none());
        assert_eq!(reopened.get("fresh").as_deref(), Some("y"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.get("access_token").is_none());

        // and it is writable again
        store.set("access_token", "abc").unwrap();
        assert_eq!(store.get("access_token").as_deref(), Some("abc"));
    }

    #[test]
    fn remove_and_clear_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get("a").is_none());
        assert_eq!(reopened.get("b").as_deref(), Some("2"));

        reopened.clear().unwrap();
        let again = FileStore::open(&path).unwrap();
        assert!(again.get("b").is_none());
    }
}
