//! Core types and token codec for authflow.
//!
//! This crate provides the foundational pieces shared by the rest of the
//! workspace:
//!
//! - **Token codec**: unsigned-payload expiry inspection of bearer tokens
//! - **Credential types**: the access/refresh token pair and the user summary
//!   issued alongside it
//! - **API envelope**: the `{ success, message, data, meta }` wrapper the
//!   authentication API returns
//!
//! # Example
//!
//! ```
//! use authflow_core::token;
//!
//! // Anything that fails to decode is treated as expired.
//! assert!(token::is_expired("not-a-token"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod token;
pub mod types;

pub use types::{ApiResponse, Credentials, Meta, NewUser, UserSummary};
