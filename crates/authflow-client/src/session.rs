//! The session service: the public face of the session manager.
//!
//! Orchestrates transport, authorizer, translator and store behind the
//! operations the application actually calls. Every operation follows the
//! same linear pipeline: authorize (when marked), send, translate on
//! failure.

use std::sync::Arc;

use authflow_core::{token, Credentials, NewUser};
use authflow_store::SessionStore;

use crate::authorizer::{RefreshTokens, RequestAuthorizer};
use crate::config::ClientConfig;
use crate::error::{Failure, Result};
use crate::translate::{ErrorTranslator, Navigator};
use crate::transport::AuthTransport;

/// The session as derivable from stored tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No access token stored.
    Anonymous,
    /// Access token stored and live.
    Active,
    /// Access token expired, refresh token live: next authorized request
    /// will refresh transparently.
    Refreshable,
    /// Both tokens stored but dead.
    Expired,
}

/// Authentication operations over a shared store.
pub struct SessionService {
    transport: Arc<AuthTransport>,
    authorizer: RequestAuthorizer,
    translator: ErrorTranslator,
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    /// Wire up a service from configuration, a store and a navigator.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let translator = ErrorTranslator::new(
            config.translate.clone(),
            config.user_agent.clone(),
            store.clone(),
            navigator,
        );
        let transport = Arc::new(AuthTransport::new(config));
        let authorizer = RequestAuthorizer::new(
            store.clone(),
            transport.clone() as Arc<dyn RefreshTokens>,
        );

        Self {
            transport,
            authorizer,
            translator,
            store,
        }
    }

    /// Sign in and persist the issued credential pair.
    ///
    /// # Errors
    ///
    /// Returns the translated error when authentication fails.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Credentials> {
        let creds = self.finish(self.transport.login(email, password).await)?;
        self.persist(&creds);
        Ok(creds)
    }

    /// Register a new account and persist the issued credential pair.
    ///
    /// # Errors
    ///
    /// Returns the translated error when registration fails.
    pub async fn sign_up(&self, user: &NewUser) -> Result<Credentials> {
        let creds = self.finish(self.transport.register(user).await)?;
        self.persist(&creds);
        Ok(creds)
    }

    /// Drop the stored credential pair.
    pub fn sign_out(&self) {
        if let Err(e) = self.store.clear_token_pair() {
            tracing::warn!(error = %e, "failed to clear tokens on sign-out");
        }
    }

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns the translated error when the request fails.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        self.finish(self.transport.forgot_password(email).await)
    }

    /// Set a new password using a reset token.
    ///
    /// # Errors
    ///
    /// Returns the translated error when the token is rejected.
    pub async fn reset_password(&self, reset_token: &str, password: &str) -> Result<()> {
        self.finish(self.transport.reset_password(reset_token, password).await)
    }

    /// Confirm an email address.
    ///
    /// # Errors
    ///
    /// Returns the translated error when the token is rejected.
    pub async fn verify_email(&self, verification_token: &str) -> Result<()> {
        self.finish(self.transport.verify_email(verification_token).await)
    }

    /// Check whether a reset token is still valid.
    ///
    /// # Errors
    ///
    /// Returns the translated error when the token is rejected.
    pub async fn verify_token(&self, reset_token: &str) -> Result<()> {
        self.finish(self.transport.verify_token(reset_token).await)
    }

    /// Ask for the verification email to be resent.
    ///
    /// Marked as needing authorization: the current session's access token
    /// is attached, refreshed first if necessary.
    ///
    /// # Errors
    ///
    /// Returns the translated error when authorization or the request fails.
    pub async fn request_email_verification(&self) -> Result<()> {
        let bearer = self.finish(self.authorizer.authorize().await)?;
        self.finish(self.transport.resend_verification(bearer.as_deref()).await)
    }

    /// Derive the session state from the stored tokens.
    #[must_use]
    pub fn current_session(&self) -> SessionState {
        let Some(access) = self.store.access_token() else {
            return SessionState::Anonymous;
        };
        if !token::is_expired(&access) {
            return SessionState::Active;
        }
        if let Some(refresh) = self.store.refresh_token() {
            if !token::is_expired(&refresh) {
                return SessionState::Refreshable;
            }
        }
        SessionState::Expired
    }

    /// The authorizer, for embedders that mark their own requests.
    #[must_use]
    pub const fn authorizer(&self) -> &RequestAuthorizer {
        &self.authorizer
    }

    fn persist(&self, creds: &Credentials) {
        if let Err(e) = self
            .store
            .store_token_pair(&creds.access_token, &creds.refresh_token)
        {
            tracing::warn!(error = %e, "failed to persist credentials");
        }
    }

    /// Close the pipeline: successes pass, failures are translated.
    fn finish<T>(&self, result: std::result::Result<T, Failure>) -> Result<T> {
        result.map_err(|failure| self.translator.translate(&failure))
    }
}
