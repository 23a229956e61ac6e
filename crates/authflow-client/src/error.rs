//! Failure taxonomy for the session manager.
//!
//! Heterogeneous failure inputs are classified exactly once, at the boundary,
//! into the [`Failure`] union. Everything downstream — logging, telemetry,
//! the 401 teardown, the message handed back to callers — works off that one
//! classification.

use thiserror::Error;

/// A result type carrying a translated error.
pub type Result<T> = std::result::Result<T, TranslatedError>;

/// A raw failure before translation.
#[derive(Debug)]
pub enum Failure {
    /// An HTTP error response from the server.
    Http {
        /// Response status code.
        status: u16,
        /// The request URL.
        url: Option<String>,
        /// Server-provided message, when the body carried one.
        message: Option<String>,
        /// Field-level validation errors from the body, when present.
        errors: Option<Vec<serde_json::Value>>,
    },

    /// A connection-level failure: no HTTP status ever existed. Reported
    /// with the conventional status 0.
    Transport {
        /// Diagnostic from the transport layer.
        message: String,
        /// The request URL, when known.
        url: Option<String>,
    },

    /// A client-side exception (e.g., a response body that would not parse).
    Script {
        /// The exception's message.
        message: String,
    },

    /// A plain string failure.
    Text(String),

    /// An arbitrary object failure.
    Object(serde_json::Value),

    /// Anything else.
    Unknown,
}

impl From<reqwest::Error> for Failure {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport {
            url: e.url().map(ToString::to_string),
            message: e.to_string(),
        }
    }
}

/// Severity classes, one per [`Failure`] shape plus the HTTP subdivisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Status 0: the connection itself failed.
    Connection,
    /// Status 500 and above.
    Server,
    /// Status 400 through 499.
    Client,
    /// Any other HTTP status.
    Info,
    /// A client-side exception.
    Script,
    /// A plain string failure.
    Text,
    /// An object failure.
    Object,
    /// Unclassifiable input.
    Unknown,
}

/// The single normalized error every operation concludes with.
///
/// `message` is always the resolved message, never the raw input.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TranslatedError {
    /// Human-readable message for the caller to surface.
    pub message: String,
    /// HTTP status, or a negative pseudo-status for non-HTTP failures
    /// (-1 script, -2 text, -3 object; 0 for connection and unknown).
    pub status: i32,
    /// Severity class assigned during translation.
    pub severity: Severity,
}

/// The built-in fallback message for a status code, used only when neither a
/// custom override nor a server message applies.
#[must_use]
pub fn fallback_message(status: u16) -> String {
    match status {
        0 => "connection error".to_string(),
        400 => "invalid request".to_string(),
        401 => "session expired".to_string(),
        403 => "not permitted".to_string(),
        404 => "resource not found".to_string(),
        500 => "internal server error".to_string(),
        503 => "service temporarily unavailable".to_string(),
        status => format!("server error ({status})"),
    }
}
