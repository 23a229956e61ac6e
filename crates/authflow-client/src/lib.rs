//! Authenticated HTTP session manager.
//!
//! This crate owns the access/refresh token lifecycle for a JSON API:
//!
//! - Transparent token refresh before requests marked as needing
//!   authorization
//! - Route guards gating navigation on session state
//! - Centralized failure translation with a 401 teardown and bounded
//!   error telemetry
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  SessionService  │────▶│ RequestAuthorizer│──refresh──┐
//! │  (operations)    │     │ (bearer resolve) │           │
//! └───────┬──────────┘     └────────┬─────────┘           │
//!         │                         │              ┌──────▼───────┐
//!         │                ┌────────▼─────────┐    │ AuthTransport│
//!         │                │   SessionStore   │    │  (reqwest)   │
//!         │                │  (token state)   │    └──────────────┘
//!         │                └────────▲─────────┘
//! ┌───────▼──────────┐             │
//! │ ErrorTranslator  │─────teardown┘
//! │ (401, telemetry) │
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use authflow_client::{ClientConfig, NoopNavigator, SessionService};
//! use authflow_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = SessionService::new(
//!     ClientConfig::new("https://api.example.com"),
//!     Arc::new(MemoryStore::default()),
//!     Arc::new(NoopNavigator),
//! );
//!
//! let creds = service.sign_in("ada@example.com", "secret").await?;
//! println!("signed in as {}", creds.user.name);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod authorizer;
pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod translate;
pub mod transport;

pub use authorizer::{RefreshTokens, RequestAuthorizer};
pub use config::{ClientConfig, TranslateConfig};
pub use error::{fallback_message, Failure, Result, Severity, TranslatedError};
pub use guard::{GuardDecision, SessionGuard};
pub use session::{SessionService, SessionState};
pub use translate::{ErrorTranslator, Navigator, NoopNavigator, RecordingNavigator};
pub use transport::AuthTransport;
