//! HTTP transport for the authentication API.
//!
//! Thin, typed endpoint calls. Failures come back as raw [`Failure`] values;
//! translation into user-facing errors happens one layer up, in the session
//! service, so that every operation funnels through the same pipeline:
//! authorize, send, translate on failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use authflow_core::{ApiResponse, Credentials, NewUser};

use crate::authorizer::RefreshTokens;
use crate::config::ClientConfig;
use crate::error::Failure;

/// Client for the authentication endpoints.
pub struct AuthTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl AuthTransport {
    /// Create a transport with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should never happen with
    /// default TLS).
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(&config.user_agent)
            .build()
            .expect("failed to create HTTP client");

        Self { client, config }
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the request is rejected or the
    /// connection fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, Failure> {
        let response = self
            .send(self.client.post(self.config.login_url()).json(
                &serde_json::json!({ "email": email, "password": password }),
            ))
            .await?;
        Self::unwrap_data(response).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the request is rejected or the
    /// connection fails.
    pub async fn register(&self, user: &NewUser) -> Result<Credentials, Failure> {
        let response = self
            .send(self.client.post(self.config.register_url()).json(user))
            .await?;
        Self::unwrap_data(response).await
    }

    /// Exchange a refresh token for a new credential pair. The bearer header
    /// carries the refresh token itself.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the token is rejected or the connection
    /// fails.
    pub async fn refresh_token(&self, refresh: &str) -> Result<Credentials, Failure> {
        let response = self
            .send(
                self.client
                    .post(self.config.refresh_url())
                    .bearer_auth(refresh)
                    .json(&serde_json::json!({})),
            )
            .await?;
        Self::unwrap_data(response).await
    }

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the request is rejected or the
    /// connection fails.
    pub async fn forgot_password(&self, email: &str) -> Result<(), Failure> {
        self.send(
            self.client
                .post(self.config.forgot_password_url())
                .json(&serde_json::json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    /// Set a new password. The bearer header carries the reset token.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the token is rejected or the connection
    /// fails.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), Failure> {
        self.send(
            self.client
                .post(self.config.reset_password_url())
                .bearer_auth(token)
                .json(&serde_json::json!({ "password": password })),
        )
        .await?;
        Ok(())
    }

    /// Confirm an email address with the token from the verification mail.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the token is rejected or the connection
    /// fails.
    pub async fn verify_email(&self, token: &str) -> Result<(), Failure> {
        self.send(
            self.client
                .get(self.config.verify_email_url())
                .query(&[("token", token)]),
        )
        .await?;
        Ok(())
    }

    /// Check whether a reset token is still valid.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the token is rejected or the connection
    /// fails.
    pub async fn verify_token(&self, token: &str) -> Result<(), Failure> {
        self.send(self.client.get(self.config.verify_token_url(token)))
            .await?;
        Ok(())
    }

    /// Ask the server to resend the verification email.
    ///
    /// Marked as needing authorization: the caller resolves the bearer via
    /// the request authorizer and passes it in, `None` meaning the request
    /// goes out unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns the raw failure when the request is rejected or the
    /// connection fails.
    pub async fn resend_verification(&self, bearer: Option<&str>) -> Result<(), Failure> {
        let mut request = self
            .client
            .post(self.config.resend_verification_url())
            .json(&serde_json::json!({}));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request).await?;
        Ok(())
    }

    /// Send a request, converting any non-success outcome into a [`Failure`].
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Failure> {
        let response = request.send().await.map_err(Failure::from)?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::failure_from_response(response).await)
        }
    }

    /// Build an HTTP failure from an error response, pulling the server
    /// message and validation errors out of the body when they exist.
    async fn failure_from_response(response: reqwest::Response) -> Failure {
        let status = response.status().as_u16();
        let url = Some(response.url().to_string());
        let body: Option<serde_json::Value> = response.json().await.ok();

        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.is_empty())
            .map(String::from);
        let errors = body
            .as_ref()
            .and_then(|b| b.get("errors"))
            .and_then(serde_json::Value::as_array)
            .cloned();

        Failure::Http {
            status,
            url,
            message,
            errors,
        }
    }

    /// Unwrap the `data` field out of the response envelope.
    async fn unwrap_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Failure> {
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| Failure::Script {
            message: format!("invalid response body: {e}"),
        })?;

        envelope.data.ok_or_else(|| Failure::Script {
            message: "response envelope carried no data".to_string(),
        })
    }
}

#[async_trait]
impl RefreshTokens for AuthTransport {
    async fn refresh(&self, refresh_token: &str) -> Result<Credentials, Failure> {
        self.refresh_token(refresh_token).await
    }
}
