//! Adapters for the hosted auth service.
//!
//! The service exposes a GoTrue-style HTTP API. `AuthApiClient` validates
//! bearer credentials server-side; [`sessions::AuthApiSessions`] drives the
//! password sign-in and sign-out flows and publishes auth-state events.

pub mod sessions;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::domain::ports::{TokenAuthenticationError, TokenAuthenticator};
use crate::domain::{BearerToken, UserId};
use crate::outbound::status_message;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// User record returned by `GET /auth/v1/user`.
#[derive(Debug, Deserialize)]
struct AuthUserDto {
    id: String,
}

/// Bearer-credential validator backed by the hosted auth service.
///
/// Validation asks the auth service to resolve the token to a user rather
/// than decoding the token locally, so revoked sessions are rejected
/// immediately.
pub struct AuthApiClient {
    client: Client,
    base_url: Url,
    anon_key: String,
}

impl AuthApiClient {
    /// Build a client with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, anon_key: String) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, anon_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        base_url: Url,
        anon_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            anon_key,
        })
    }

    fn user_endpoint(&self) -> Result<Url, TokenAuthenticationError> {
        self.base_url
            .join("auth/v1/user")
            .map_err(|error| TokenAuthenticationError::unavailable(error.to_string()))
    }
}

#[async_trait]
impl TokenAuthenticator for AuthApiClient {
    async fn authenticate(&self, token: &BearerToken) -> Result<UserId, TokenAuthenticationError> {
        let response = self
            .client
            .get(self.user_endpoint()?)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|error| TokenAuthenticationError::unavailable(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| TokenAuthenticationError::unavailable(error.to_string()))?;
        if !status.is_success() {
            return Err(map_auth_status(status, body.as_ref()));
        }
        parse_authenticated_user(body.as_ref())
    }
}

fn parse_authenticated_user(body: &[u8]) -> Result<UserId, TokenAuthenticationError> {
    let decoded: AuthUserDto = serde_json::from_slice(body).map_err(|error| {
        TokenAuthenticationError::unavailable(format!("invalid auth service payload: {error}"))
    })?;
    UserId::new(&decoded.id).map_err(|error| {
        TokenAuthenticationError::unavailable(format!("auth service returned a bad user id: {error}"))
    })
}

fn map_auth_status(status: StatusCode, body: &[u8]) -> TokenAuthenticationError {
    let message = status_message(status, body);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        TokenAuthenticationError::invalid_token(message)
    } else {
        TokenAuthenticationError::unavailable(message)
    }
}
