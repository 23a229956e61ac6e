//! Request authorization with transparent token refresh.
//!
//! Only requests marked as needing authorization come through here. The
//! authorizer resolves which bearer token, if any, such a request should
//! carry, refreshing an expired access token first when the stored refresh
//! token still allows it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use authflow_core::{token, Credentials};
use authflow_store::SessionStore;

use crate::error::Failure;

/// The refresh capability the authorizer depends on, kept behind a trait so
/// tests can count and script refresh calls.
#[async_trait]
pub trait RefreshTokens: Send + Sync {
    /// Exchange a refresh token for a new credential pair.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the exchange is rejected or the
    /// connection fails.
    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, Failure>;
}

/// Resolves the bearer token for requests marked as needing authorization.
pub struct RequestAuthorizer {
    store: Arc<dyn SessionStore>,
    refresher: Arc<dyn RefreshTokens>,
    // Single-flight gate: concurrent requests that all observe an expired
    // access token serialize here, and the winner's refresh serves them all.
    refresh_gate: Mutex<()>,
}

impl RequestAuthorizer {
    /// Create an authorizer over the given store and refresh capability.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, refresher: Arc<dyn RefreshTokens>) -> Self {
        Self {
            store,
            refresher,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Resolve the bearer for a marked request.
    ///
    /// `Ok(Some(token))` means attach `Authorization: Bearer <token>`;
    /// `Ok(None)` means forward the request unauthenticated. An expired
    /// refresh token also yields `Ok(None)`: teardown is deferred to the
    /// 401 path rather than performed here.
    ///
    /// # Errors
    ///
    /// Propagates a failed refresh attempt. No header is attached and no
    /// second attempt is made.
    pub async fn authorize(&self) -> Result<Option<String>, Failure> {
        let Some(access) = self.store.access_token() else {
            return Ok(None);
        };
        if !token::is_expired(&access) {
            return Ok(Some(access));
        }

        let Some(refresh) = self.store.refresh_token() else {
            tracing::debug!("access token expired and no refresh token stored, forwarding unauthenticated");
            return Ok(None);
        };
        if token::is_expired(&refresh) {
            tracing::debug!("refresh token expired, deferring teardown to the 401 path");
            return Ok(None);
        }

        let _gate = self.refresh_gate.lock().await;

        // Another request may have finished the refresh while we waited.
        if let Some(access) = self.store.access_token() {
            if !token::is_expired(&access) {
                return Ok(Some(access));
            }
        }

        tracing::debug!("access token expired, refreshing");
        let creds = self.refresher.refresh(&refresh).await?;
        if let Err(e) = self
            .store
            .store_token_pair(&creds.access_token, &creds.refresh_token)
        {
            tracing::warn!(error = %e, "failed to persist refreshed tokens");
        }

        Ok(Some(creds.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use authflow_core::UserSummary;
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

    struct ScriptedRefresher {
        calls: AtomicUsize,
        outcome: std::result::Result<(String, String), String>,
    }

    impl ScriptedRefresher {
        fn succeeding(access: String, refresh: String) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Ok((access, refresh)),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Err(message.to_string()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RefreshTokens for ScriptedRefresher {
        async fn refresh(&self, _refresh_token: &str) -> Result<Credentials, Failure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok((access, refresh)) => Ok(Credentials {
                    access_token: access.clone(),
                    refresh_token: refresh.clone(),
                    user: UserSummary {
                        id: uuid::Uuid::new_v4().to_string(),
                        name: "Ada".to_string(),
                        email: "ada@example.com".to_string(),
                        roles: vec![],
                    },
                }),
                Err(message) => Err(Failure::Http {
                    status: 401,
                    url: None,
                    message: Some(message.clone()),
                    errors: None,
                }),
            }
        }
    }

    fn authorizer(
        store: Arc<MemoryStore>,
        refresher: Arc<ScriptedRefresher>,
    ) -> RequestAuthorizer {
        RequestAuthorizer::new(store, refresher)
    }

    #[tokio::test]
    async fn no_access_token_forwards_unauthenticated() {
        let store = Arc::new(MemoryStore::default());
        let refresher = Arc::new(ScriptedRefresher::succeeding(mint(3600), mint(7200)));

        let bearer = authorizer(store, refresher.clone()).authorize().await.unwrap();
        assert!(bearer.is_none());
        assert_eq!(refresher.call_count(), 0);
    }

    #[tokio::test]
    async fn fresh_access_token_is_attached_verbatim() {
        let store = Arc::new(MemoryStore::default());
        let access = mint(3600);
        store.store_token_pair(&access, &mint(7200)).unwrap();
        let refresher = Arc::new(ScriptedRefresher::succeeding(mint(3600), mint(7200)));

        let bearer = authorizer(store, refresher.clone()).authorize().await.unwrap();
        assert_eq!(bearer.as_deref(), Some(access.as_str()));
        assert_eq!(refresher.call_count(), 0);
    }

    #[tokio::test]
    async fn expired_access_with_valid_refresh_refreshes_once() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(-60), &mint(7200)).unwrap();

        let new_access = mint(3600);
        let new_refresh = mint(7200);
        let refresher = Arc::new(ScriptedRefresher::succeeding(
            new_access.clone(),
            new_refresh.clone(),
        ));

        let bearer = authorizer(store.clone(), refresher.clone())
            .authorize()
            .await
            .unwrap();

        assert_eq!(bearer.as_deref(), Some(new_access.as_str()));
        assert_eq!(refresher.call_count(), 1);
        assert_eq!(store.access_token().as_deref(), Some(new_access.as_str()));
        assert_eq!(store.refresh_token().as_deref(), Some(new_refresh.as_str()));
    }

    #[tokio::test]
    async fn expired_refresh_forwards_unauthenticated_without_clearing() {
        let store = Arc::new(MemoryStore::default());
        let stale_access = mint(-60);
        let stale_refresh = mint(-30);
        store.store_token_pair(&stale_access, &stale_refresh).unwrap();
        let refresher = Arc::new(ScriptedRefresher::succeeding(mint(3600), mint(7200)));

        let bearer = authorizer(store.clone(), refresher.clone())
            .authorize()
            .await
            .unwrap();

        assert!(bearer.is_none());
        assert_eq!(refresher.call_count(), 0);
        // teardown is the 401 path's job, not ours
        assert_eq!(store.access_token().as_deref(), Some(stale_access.as_str()));
        assert_eq!(store.refresh_token().as_deref(), Some(stale_refresh.as_str()));
    }

    #[tokio::test]
    async fn refresh_failure_propagates() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(-60), &mint(7200)).unwrap();
        let refresher = Arc::new(ScriptedRefresher::failing("refresh rejected"));

        let result = authorizer(store, refresher.clone()).authorize().await;
        assert!(result.is_err());
        assert_eq!(refresher.call_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_refresh() {
        let store = Arc::new(MemoryStore::default());
        store.store_token_pair(&mint(-60), &mint(7200)).unwrap();
        let refresher = Arc::new(ScriptedRefresher::succeeding(mint(3600), mint(7200)));

        let authorizer = Arc::new(RequestAuthorizer::new(
            store.clone() as Arc<dyn SessionStore>,
            refresher.clone() as Arc<dyn RefreshTokens>,
        ));

        let (a, b, c) = tokio::join!(
            authorizer.authorize(),
            authorizer.authorize(),
            authorizer.authorize()
        );

        assert!(a.unwrap().is_some());
        assert!(b.unwrap().is_some());
        assert!(c.unwrap().is_some());
        assert_eq!(refresher.call_count(), 1);
    }
}
