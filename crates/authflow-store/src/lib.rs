//! Durable session storage for authflow.
//!
//! The session manager keeps exactly two pieces of state between runs: the
//! access token and the refresh token. This crate defines the [`SessionStore`]
//! trait those keys live behind, two backends, and the bounded error-history
//! log that rides in the same store.
//!
//! The trait is deliberately the only way the rest of the workspace touches
//! token state. Several components read and write it concurrently without
//! mutual exclusion; keeping the store an explicit injected dependency makes
//! that shared mutation visible and testable instead of ambient.
//!
//! # Example
//!
//! ```
//! use authflow_store::{MemoryStore, SessionStore, ACCESS_TOKEN_KEY};
//!
//! let store = MemoryStore::default();
//! store.set(ACCESS_TOKEN_KEY, "abc").unwrap();
//! assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("abc"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod file;
pub mod history;
pub mod memory;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use history::{ErrorHistory, ErrorRecord, ERROR_LOG_KEY, MAX_ERROR_RECORDS};
pub use memory::MemoryStore;

/// Key under which the access token is persisted.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key under which the refresh token is persisted.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key/value storage for session state.
///
/// Reads are infallible by design: a backend that cannot produce a value
/// reports absence, the same way a missing cookie would.
pub trait SessionStore: Send + Sync {
    /// Read a value by key. Absent and unreadable both come back as `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value under a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to persist the write.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to persist the removal.
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to persist the wipe.
    fn clear(&self) -> Result<()>;

    /// Read the stored access token.
    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    /// Read the stored refresh token.
    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    /// Persist a credential pair.
    ///
    /// The pair is always written together; callers observing the store see
    /// either the old pair or the new one plus at most a transient mix while
    /// the second write lands. There is no cross-component locking here, by
    /// the same token-store race the rest of the system is documented with.
    ///
    /// # Errors
    ///
    /// Returns the first write failure; the refresh token is not written if
    /// the access token write fails.
    fn store_token_pair(&self, access: &str, refresh: &str) -> Result<()> {
        self.set(ACCESS_TOKEN_KEY, access)?;
        self.set(REFRESH_TOKEN_KEY, refresh)
    }

    /// Remove both tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if either removal fails to persist.
    fn clear_token_pair(&self) -> Result<()> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)
    }
}
