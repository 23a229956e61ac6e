//! Client configuration types.

use std::collections::HashMap;

use serde::Deserialize;

/// Configuration for the session manager.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., `http://localhost:3000`).
    #[serde(default = "ClientConfig::default_base_url")]
    pub base_url: String,

    /// Path prefix of the authentication endpoints.
    #[serde(default = "ClientConfig::default_auth_path")]
    pub auth_path: String,

    /// Request timeout in seconds.
    #[serde(default = "ClientConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// User-agent string sent with every request and recorded in telemetry.
    #[serde(default = "ClientConfig::default_user_agent")]
    pub user_agent: String,

    /// Public entry route denied navigations are redirected to.
    #[serde(default = "ClientConfig::default_public_route")]
    pub public_route: String,

    /// Root of the authenticated area.
    #[serde(default = "ClientConfig::default_protected_route")]
    pub protected_route: String,

    /// Failure-translation behavior.
    #[serde(default)]
    pub translate: TranslateConfig,
}

impl ClientConfig {
    fn default_base_url() -> String {
        "http://localhost:3000".to_string()
    }

    fn default_auth_path() -> String {
        "/auth".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    fn default_user_agent() -> String {
        concat!("authflow/", env!("CARGO_PKG_VERSION")).to_string()
    }

    fn default_public_route() -> String {
        "/".to_string()
    }

    fn default_protected_route() -> String {
        "/app".to_string()
    }

    /// Create a configuration for the given base URL, defaults elsewhere.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!(
            "{}{}{suffix}",
            self.base_url.trim_end_matches('/'),
            self.auth_path
        )
    }

    /// Login endpoint URL.
    #[must_use]
    pub fn login_url(&self) -> String {
        self.endpoint("/login")
    }

    /// Registration endpoint URL.
    #[must_use]
    pub fn register_url(&self) -> String {
        self.endpoint("/register")
    }

    /// Token refresh endpoint URL.
    #[must_use]
    pub fn refresh_url(&self) -> String {
        self.endpoint("/refresh-token")
    }

    /// Forgot-password endpoint URL.
    #[must_use]
    pub fn forgot_password_url(&self) -> String {
        self.endpoint("/forgot-password")
    }

    /// Password reset endpoint URL.
    #[must_use]
    pub fn reset_password_url(&self) -> String {
        self.endpoint("/reset-password")
    }

    /// Email verification endpoint URL; the token travels as a query parameter.
    #[must_use]
    pub fn verify_email_url(&self) -> String {
        self.endpoint("/verify-email")
    }

    /// Token verification endpoint URL; the token is a path segment.
    #[must_use]
    pub fn verify_token_url(&self, token: &str) -> String {
        self.endpoint(&format!("/verify-token/{token}"))
    }

    /// Resend-verification-email endpoint URL. This request is marked as
    /// needing authorization.
    #[must_use]
    pub fn resend_verification_url(&self) -> String {
        self.endpoint("/resend-verification-email")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            auth_path: Self::default_auth_path(),
            request_timeout_seconds: Self::default_request_timeout(),
            user_agent: Self::default_user_agent(),
            public_route: Self::default_public_route(),
            protected_route: Self::default_protected_route(),
            translate: TranslateConfig::default(),
        }
    }
}

/// Configuration for failure translation.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateConfig {
    /// Whether classification emits a log line. History persistence and the
    /// 401 teardown are unaffected by this flag.
    #[serde(default = "TranslateConfig::default_log_errors")]
    pub log_errors: bool,

    /// Whether a 401 commands a redirect. Token clearing happens either way.
    #[serde(default = "TranslateConfig::default_redirect_on_401")]
    pub redirect_on_401: bool,

    /// Route the 401 redirect targets.
    #[serde(default = "TranslateConfig::default_login_route")]
    pub login_route: String,

    /// Per-status message overrides. An override beats the server-provided
    /// message as well as the built-in fallback.
    #[serde(default)]
    pub custom_messages: HashMap<u16, String>,
}

impl TranslateConfig {
    const fn default_log_errors() -> bool {
        true
    }

    const fn default_redirect_on_401() -> bool {
        true
    }

    fn default_login_route() -> String {
        "/login".to_string()
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            log_errors: Self::default_log_errors(),
            redirect_on_401: Self::default_redirect_on_401(),
            login_route: Self::default_login_route(),
            custom_messages: HashMap::new(),
        }
    }
}
