//! Session lifecycle adapter for the hosted auth service.
//!
//! Owns the password sign-in, sign-up and sign-out flows, keeps the live
//! session in memory, and publishes [`AuthEvent`]s on a broadcast channel
//! for the session resolver.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;
use serde_json::json;
use tokio::sync::{Mutex, broadcast};
use zeroize::Zeroizing;

use crate::domain::ports::{AuthSessions, AuthSessionsError};
use crate::domain::{AuthEvent, Email, UserId};

use crate::outbound::{body_preview, status_message};

use async_trait::async_trait;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Token grant returned by `POST /auth/v1/token` and `POST /auth/v1/signup`.
#[derive(Debug, Deserialize)]
struct TokenGrantDto {
    access_token: String,
    user: GrantUserDto,
}

#[derive(Debug, Deserialize)]
struct GrantUserDto {
    id: String,
}

struct StoredSession {
    user_id: UserId,
    access_token: Zeroizing<String>,
}

/// Auth transport adapter holding the live session.
///
/// ## Invariants
/// - Local session state is cleared before the remote sign-out call so a
///   transport failure can never leave the caller signed in locally.
/// - Every state change is published as an [`AuthEvent`], even when the
///   remote call fails.
pub struct AuthApiSessions {
    client: Client,
    base_url: Url,
    anon_key: String,
    events: broadcast::Sender<AuthEvent>,
    session: Mutex<Option<StoredSession>>,
}

impl AuthApiSessions {
    /// Build the adapter with a fresh event channel and no session.
    #[must_use]
    pub fn new(client: Client, base_url: Url, anon_key: String) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client,
            base_url,
            anon_key,
            events,
            session: Mutex::new(None),
        }
    }

    /// Sign in with an email and password, storing the granted session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthSessionsError::Credentials`] when the auth service
    /// rejects the credentials and [`AuthSessionsError::Transport`] for
    /// network or decode failures.
    pub async fn sign_in(&self, email: &Email, password: &str) -> Result<UserId, AuthSessionsError> {
        let endpoint = self.endpoint("auth/v1/token?grant_type=password")?;
        let grant = self
            .request_grant(endpoint, email, password)
            .await?;
        self.store_grant(&grant, AuthEvent::SignedIn).await
    }

    /// Register a new account, storing the granted session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthSessionsError::Credentials`] when the auth service
    /// rejects the registration and [`AuthSessionsError::Transport`] for
    /// network or decode failures.
    pub async fn sign_up(&self, email: &Email, password: &str) -> Result<UserId, AuthSessionsError> {
        let endpoint = self.endpoint("auth/v1/signup")?;
        let grant = self
            .request_grant(endpoint, email, password)
            .await?;
        self.store_grant(&grant, AuthEvent::SignedIn).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthSessionsError> {
        self.base_url
            .join(path)
            .map_err(|error| AuthSessionsError::transport(error.to_string()))
    }

    async fn request_grant(
        &self,
        endpoint: Url,
        email: &Email,
        password: &str,
    ) -> Result<TokenGrantDto, AuthSessionsError> {
        let response = self
            .client
            .post(endpoint)
            .header("apikey", self.anon_key.as_str())
            .json(&json!({ "email": email.as_ref(), "password": password }))
            .send()
            .await
            .map_err(|error| AuthSessionsError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| AuthSessionsError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(map_grant_status(status, body.as_ref()));
        }
        parse_grant(body.as_ref())
    }

    async fn store_grant(
        &self,
        grant: &TokenGrantDto,
        event: fn(UserId) -> AuthEvent,
    ) -> Result<UserId, AuthSessionsError> {
        let user_id = UserId::new(&grant.user.id).map_err(|error| {
            AuthSessionsError::transport(format!("auth service returned a bad user id: {error}"))
        })?;
        {
            let mut session = self.session.lock().await;
            *session = Some(StoredSession {
                user_id,
                access_token: Zeroizing::new(grant.access_token.clone()),
            });
        }
        let _ = self.events.send(event(user_id));
        Ok(user_id)
    }
}

#[async_trait]
impl AuthSessions for AuthApiSessions {
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn current_session(&self) -> Result<Option<UserId>, AuthSessionsError> {
        let session = self.session.lock().await;
        Ok(session.as_ref().map(|stored| stored.user_id))
    }

    async fn sign_out(&self) -> Result<(), AuthSessionsError> {
        // Clear local state first; a transport failure must not keep the
        // caller signed in.
        let stored = {
            let mut session = self.session.lock().await;
            session.take()
        };
        let _ = self.events.send(AuthEvent::SignedOut);

        let Some(stored) = stored else {
            return Ok(());
        };
        let response = self
            .client
            .post(self.endpoint("auth/v1/logout")?)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(stored.access_token.as_str())
            .send()
            .await
            .map_err(|error| AuthSessionsError::transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.bytes().await.unwrap_or_default();
            Err(AuthSessionsError::transport(status_message(
                status,
                body.as_ref(),
            )))
        }
    }
}

fn parse_grant(body: &[u8]) -> Result<TokenGrantDto, AuthSessionsError> {
    serde_json::from_slice(body).map_err(|error| {
        AuthSessionsError::transport(format!("invalid token grant payload: {error}"))
    })
}

fn map_grant_status(status: StatusCode, body: &[u8]) -> AuthSessionsError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => {
            AuthSessionsError::credentials(message)
        }
        _ => AuthSessionsError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    //! Grant decoding, status mapping, and local session lifecycle.
    use rstest::rstest;

    use super::*;

    fn adapter() -> AuthApiSessions {
        AuthApiSessions::new(
            Client::new(),
            Url::parse("https://auth.example.com/").expect("fixture url"),
            "anon-key".to_owned(),
        )
    }

    #[rstest]
    #[case::bad_request(StatusCode::BAD_REQUEST)]
    #[case::unauthorised(StatusCode::UNAUTHORIZED)]
    #[case::unprocessable(StatusCode::UNPROCESSABLE_ENTITY)]
    fn rejections_map_to_credentials(#[case] status: StatusCode) {
        let error = map_grant_status(status, b"{\"msg\":\"Invalid login credentials\"}");
        assert!(matches!(error, AuthSessionsError::Credentials { .. }));
    }

    #[test]
    fn service_failures_map_to_transport() {
        let error = map_grant_status(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert!(matches!(error, AuthSessionsError::Transport { .. }));
    }

    #[test]
    fn parses_a_token_grant() {
        let body = br#"{
            "access_token": "jwt-value",
            "token_type": "bearer",
            "user": { "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6" }
        }"#;
        let grant = parse_grant(body).expect("grant should decode");
        assert_eq!(grant.access_token, "jwt-value");
        assert_eq!(grant.user.id, "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[tokio::test]
    async fn stored_grant_is_visible_as_the_current_session() {
        let sessions = adapter();
        let mut events = sessions.subscribe();
        let grant = parse_grant(
            br#"{"access_token":"jwt","user":{"id":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}}"#,
        )
        .expect("grant should decode");

        let user_id = sessions
            .store_grant(&grant, AuthEvent::SignedIn)
            .await
            .expect("grant should store");
        assert_eq!(
            sessions.current_session().await.expect("no transport"),
            Some(user_id)
        );
        assert_eq!(events.recv().await, Ok(AuthEvent::SignedIn(user_id)));
    }

    #[tokio::test]
    async fn sign_out_without_a_session_still_emits_the_event() {
        let sessions = adapter();
        let mut events = sessions.subscribe();
        sessions.sign_out().await.expect("nothing to revoke");
        assert_eq!(events.recv().await, Ok(AuthEvent::SignedOut));
        assert_eq!(sessions.current_session().await.expect("no transport"), None);
    }
}
