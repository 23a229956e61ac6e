//! Centralized failure translation.
//!
//! Every failure, whatever its shape, passes through [`ErrorTranslator`]
//! exactly once. Translation logs the failure at a severity-mapped level,
//! appends a record to the bounded error history, performs the session
//! teardown on an authentication failure, and hands the caller a single
//! normalized error. The side effects are best-effort: their own failures
//! never replace the error being reported.

use std::sync::Arc;

use chrono::Utc;

use authflow_store::{ErrorHistory, ErrorRecord, SessionStore};

use crate::config::TranslateConfig;
use crate::error::{fallback_message, Failure, Severity, TranslatedError};

/// The seam through which a redirect is commanded.
///
/// The session manager decides *that* navigation must happen; the embedding
/// application decides what navigating means.
pub trait Navigator: Send + Sync {
    /// Navigate to the given route.
    fn navigate(&self, route: &str);
}

/// A navigator that ignores every command.
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _route: &str) {}
}

/// A navigator that records commanded routes, for tests and headless
/// embeddings that poll for pending navigation.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: parking_lot::Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// The routes commanded so far, oldest first.
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().push(route.to_string());
    }
}

/// Classification output, internal to the translator.
struct Classified {
    message: String,
    status: i32,
    severity: Severity,
    url: Option<String>,
    errors: Option<Vec<serde_json::Value>>,
}

/// Converts raw failures into normalized errors, with side effects.
pub struct ErrorTranslator {
    config: TranslateConfig,
    user_agent: String,
    store: Arc<dyn SessionStore>,
    history: ErrorHistory,
    navigator: Arc<dyn Navigator>,
}

impl ErrorTranslator {
    /// Create a translator over the given store and navigator.
    #[must_use]
    pub fn new(
        config: TranslateConfig,
        user_agent: impl Into<String>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            user_agent: user_agent.into(),
            history: ErrorHistory::new(store.clone()),
            store,
            navigator,
        }
    }

    /// Translate a failure into the error the caller receives.
    ///
    /// Order of effects mirrors their importance: log, then the 401
    /// teardown, then the history append — so the record of an
    /// authentication failure survives the storage wipe it causes.
    pub fn translate(&self, failure: &Failure) -> TranslatedError {
        let classified = self.classify(failure);

        if self.config.log_errors {
            Self::log(&classified);
        }

        if classified.status == 401 {
            self.teardown();
        }

        self.history.append(ErrorRecord {
            message: classified.message.clone(),
            status: classified.status,
            timestamp: Utc::now(),
            url: classified.url.clone(),
            errors: classified.errors.clone(),
            user_agent: self.user_agent.clone(),
        });

        TranslatedError {
            message: classified.message,
            status: classified.status,
            severity: classified.severity,
        }
    }

    fn classify(&self, failure: &Failure) -> Classified {
        match failure {
            Failure::Http {
                status,
                url,
                message,
                errors,
            } => {
                let severity = match *status {
                    0 => Severity::Connection,
                    s if s >= 500 => Severity::Server,
                    s if (400..500).contains(&s) => Severity::Client,
                    _ => Severity::Info,
                };
                Classified {
                    message: self.resolve_message(*status, message.as_deref()),
                    status: i32::from(*status),
                    severity,
                    url: url.clone(),
                    errors: errors.clone(),
                }
            }
            Failure::Transport { message, url } => {
                // The transport diagnostic goes to the log; the caller gets
                // the status-0 message resolution.
                tracing::debug!(source = %message, "transport failure");
                Classified {
                    message: self.resolve_message(0, None),
                    status: 0,
                    severity: Severity::Connection,
                    url: url.clone(),
                    errors: None,
                }
            }
            Failure::Script { message } => Classified {
                message: message.clone(),
                status: -1,
                severity: Severity::Script,
                url: None,
                errors: None,
            },
            Failure::Text(message) => Classified {
                message: message.clone(),
                status: -2,
                severity: Severity::Text,
                url: None,
                errors: None,
            },
            Failure::Object(value) => {
                let message = value
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map_or_else(|| "unknown object error".to_string(), String::from);
                Classified {
                    message,
                    status: -3,
                    severity: Severity::Object,
                    url: None,
                    errors: None,
                }
            }
            Failure::Unknown => Classified {
                message: "unknown error".to_string(),
                status: 0,
                severity: Severity::Unknown,
                url: None,
                errors: None,
            },
        }
    }

    /// Message precedence for status-bearing failures: custom override,
    /// then server message, then the fallback table.
    fn resolve_message(&self, status: u16, server_message: Option<&str>) -> String {
        if let Some(custom) = self.config.custom_messages.get(&status) {
            return custom.clone();
        }
        if let Some(message) = server_message {
            if !message.is_empty() {
                return message.to_string();
            }
        }
        fallback_message(status)
    }

    fn log(classified: &Classified) {
        let status = classified.status;
        let reason = classified.message.as_str();
        match classified.severity {
            Severity::Connection | Severity::Server => {
                tracing::error!(status, reason, "request failed");
            }
            Severity::Client | Severity::Script => {
                tracing::warn!(status, reason, "request failed");
            }
            Severity::Info | Severity::Text | Severity::Object | Severity::Unknown => {
                tracing::info!(status, reason, "request failed");
            }
        }
        if let Some(errors) = &classified.errors {
            tracing::debug!(?errors, "validation errors");
        }
    }

    /// Authentication failed: wipe the durable store (tokens included) and,
    /// unless suppressed, command a redirect to the login route.
    fn teardown(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear session storage");
        }
        if self.config.redirect_on_401 {
            self.navigator.navigate(&self.config.login_route);
        }
    }
}
