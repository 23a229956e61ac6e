//! Credential and API envelope types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as reported by the authentication API.
///
/// Immutable once issued; the session manager never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Unique user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role names granted to the user.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Session credentials issued by login, register and refresh.
///
/// Only the token pair is persisted between runs; `user` is ephemeral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived bearer token presented on authorized requests.
    #[serde(rename = "token")]
    pub access_token: String,
    /// Longer-lived token exchanged for a fresh pair.
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    /// The user the credentials belong to.
    #[serde(flatten)]
    pub user: UserSummary,
}

/// Registration payload for a new account.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Initial password.
    pub password: String,
}

/// The envelope the API wraps every response in.
///
/// Consumers only read `data`; `message` participates in failure
/// translation when a request is rejected.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the server considered the request successful.
    pub success: bool,
    /// Human-readable outcome description.
    #[serde(default)]
    pub message: String,
    /// The actual payload.
    pub data: Option<T>,
    /// Request metadata.
    pub meta: Option<Meta>,
}

/// Request metadata attached to every envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// When the server produced the response.
    pub timestamp: DateTime<Utc>,
    /// Server-assigned request id.
    pub request_id: String,
    /// The request path as the server saw it.
    pub path: String,
}
