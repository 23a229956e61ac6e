//! Route-activation guards.
//!
//! Guards produce pure decision values; the embedding router executes them.
//! That keeps cancellation trivial: a navigation abandoned mid-check simply
//! drops the evaluation, and a stale decision is never applied because
//! nothing was mutated to produce it — except the removal of an already-dead
//! token pair, which is idempotent.

use std::sync::Arc;

use authflow_core::token;
use authflow_store::SessionStore;

use crate::config::ClientConfig;

/// The outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Activate the route.
    Allow,
    /// Deny activation and navigate elsewhere instead.
    Redirect {
        /// Route to navigate to.
        to: String,
        /// The originally requested path, preserved so the application can
        /// return there after login.
        return_to: Option<String>,
    },
}

/// Session-state predicates evaluated before route activation.
pub struct SessionGuard {
    store: Arc<dyn SessionStore>,
    public_entry: String,
    protected_root: String,
}

impl SessionGuard {
    /// Create a guard over the given store, taking routes from the config.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, config: &ClientConfig) -> Self {
        Self {
            store,
            public_entry: config.public_route.clone(),
            protected_root: config.protected_route.clone(),
        }
    }

    /// Gate navigation into the authenticated area.
    ///
    /// A session counts when the access token is live, or when it has
    /// expired but the refresh token has not — the authorizer performs the
    /// actual refresh on the next outgoing request, so navigation need not
    /// wait on the network. With both tokens dead the stale pair is removed
    /// and the navigation is bounced to the public entry.
    #[must_use]
    pub fn require_session(&self, requested_path: &str) -> GuardDecision {
        let Some(access) = self.store.access_token() else {
            return self.deny(requested_path);
        };

        if !token::is_expired(&access) {
            return GuardDecision::Allow;
        }

        if let Some(refresh) = self.store.refresh_token() {
            if !token::is_expired(&refresh) {
                return GuardDecision::Allow;
            }
        }

        if let Err(e) = self.store.clear_token_pair() {
            tracing::warn!(error = %e, "failed to remove stale tokens");
        }
        self.deny(requested_path)
    }

    /// Gate navigation into the public auth area: a live or refreshable
    /// session belongs in the authenticated area instead.
    #[must_use]
    pub fn require_anonymous(&self) -> GuardDecision {
        if let Some(access) = self.store.access_token() {
            if !token::is_expired(&access) {
                return self.into_app();
            }
            if let Some(refresh) = self.store.refresh_token() {
                if !token::is_expired(&refresh) {
                    return self.into_app();
                }
            }
        }
        GuardDecision::Allow
    }

    fn deny(&self, requested_path: &str) -> GuardDecision {
        // The protected root itself is not worth returning to after login.
        let return_to =
            (requested_path != self.protected_root).then(|| requested_path.to_string());
        GuardDecision::Redirect {
            to: self.public_entry.clone(),
            return_to,
        }
    }

    fn into_app(&self) -> GuardDecision {
        GuardDecision::Redirect {
            to: self.protected_root.clone(),
            return_to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use authflow_store::MemoryStore;

    fn mint(offset_seconds: i64) -> String {
        let exp = Utc::now().timestamp() + offset_seconds;
        encode(
            &Header::default(),
            &serde_json::json!({ "sub": "u1", "exp": exp }),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    fn guard(store: Arc<MemoryStore>) -> SessionGuard {
        SessionGuard::new(store, &ClientConfig::default())
    }

    #[test]
    fn no_tokens_denies_with_return_target() {
        let store = Arc::new(MemoryStore::default());

        let decision = guard(store).require_session("/app/settings");
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/".to_string(),
                return_to: Some("/app/settings".to_string()),
            }
        );
    }

    #[test]
    fn protected_root_denial_carries_no_return_target() {
        let store = Arc::new(MemoryStore::default());

        let decision = guard(store).require_session("/app");
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/".to_string(),
                return_to: None,
            }
        );
    }

    #[test]
    fn live_access_token_allows() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(3600), &mint(7200)).unwrap();

        assert_eq!(guard(store).require_session("/app"), GuardDecision::Allow);
    }

    #[test]
    fn refreshable_session_allows_without_refreshing() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(-60), &mint(7200)).unwrap();

        assert_eq!(
            guard(store.clone()).require_session("/app"),
            GuardDecision::Allow
        );
        // the expired access token is left for the authorizer to replace
        assert!(store.access_token().is_some());
    }

    #[test]
    fn dead_session_is_cleared_and_denied() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(-60), &mint(-30)).unwrap();

        let decision = guard(store.clone()).require_session("/app/notes");
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/".to_string(),
                return_to: Some("/app/notes".to_string()),
            }
        );
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn anonymous_guard_allows_without_session() {
        let store = Arc::new(MemoryStore::default());
        assert_eq!(guard(store).require_anonymous(), GuardDecision::Allow);
    }

    #[test]
    fn anonymous_guard_bounces_live_session_into_app() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(3600), &mint(7200)).unwrap();

        assert_eq!(
            guard(store).require_anonymous(),
            GuardDecision::Redirect {
                to: "/app".to_string(),
                return_to: None,
            }
        );
    }

    #[test]
    fn anonymous_guard_bounces_refreshable_session_too() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(-60), &mint(7200)).unwrap();

        assert_eq!(
            guard(store).require_anonymous(),
            GuardDecision::Redirect {
                to: "/app".to_string(),
                return_to: None,
            }
        );
    }

    #[test]
    fn anonymous_guard_allows_fully_expired_session() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(-60), &mint(-30)).unwrap();

        assert_eq!(guard(store).require_anonymous(), GuardDecision::Allow);
    }
}
