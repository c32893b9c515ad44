//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the hosted auth API and the trusted data API). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use super::auth::BearerToken;
use super::identity::{Identity, UserId};
use super::role::Role;
use super::session::AuthEvent;

/// Errors surfaced by the auth transport adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthSessionsError {
    /// The auth service rejected the supplied credentials.
    #[error("auth service rejected the credentials: {message}")]
    Credentials { message: String },
    /// Network failure or unexpected response from the auth service.
    #[error("auth transport failed: {message}")]
    Transport { message: String },
}

impl AuthSessionsError {
    /// Helper for credential rejections.
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Helper for transport-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the profile store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileStoreError {
    /// The store could not be reached.
    #[error("profile store connection failed: {message}")]
    Connection { message: String },
    /// The lookup itself failed or returned an unusable row.
    #[error("profile store query failed: {message}")]
    Query { message: String },
}

impl ProfileStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the trusted role store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleStoreError {
    /// The store could not be reached.
    #[error("role store connection failed: {message}")]
    Connection { message: String },
    /// The lookup itself failed or returned an unusable row.
    #[error("role store query failed: {message}")]
    Query { message: String },
}

impl RoleStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Errors surfaced when validating a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenAuthenticationError {
    /// The credential is missing, malformed, or expired.
    #[error("bearer credential rejected: {message}")]
    InvalidToken { message: String },
    /// The auth service could not be consulted; callers must fail closed.
    #[error("auth service unavailable: {message}")]
    Unavailable { message: String },
}

impl TokenAuthenticationError {
    /// Helper for rejected credentials.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Helper for unreachable-service failures.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Auth transport consumed by the session resolver.
///
/// `subscribe` must be callable before `current_session` so no event is
/// missed between listener attachment and the persisted-session fetch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthSessions: Send + Sync {
    /// Subscribe to auth-state change events.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Fetch the persisted session, when one exists.
    async fn current_session(&self) -> Result<Option<UserId>, AuthSessionsError>;

    /// Invalidate the backend session.
    async fn sign_out(&self) -> Result<(), AuthSessionsError>;
}

/// Read-only profile lookup keyed by identity id.
///
/// Absence of a row is a valid outcome, not an error; the resolver treats it
/// as "no identity".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the display profile for an identity.
    async fn find_by_user_id(&self, user_id: &UserId)
    -> Result<Option<Identity>, ProfileStoreError>;
}

/// Read-only role lookup keyed by identity id.
///
/// Absence of a row is a valid outcome defaulting to the lowest-privilege
/// role at the call sites; adapters must never synthesise a row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Fetch the authoritative role for an identity.
    async fn find_by_user_id(&self, user_id: &UserId) -> Result<Option<Role>, RoleStoreError>;
}

/// Bearer-credential validation against the trusted auth service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    /// Validate the credential and return the caller's identity id.
    async fn authenticate(&self, token: &BearerToken) -> Result<UserId, TokenAuthenticationError>;
}

/// Location abstraction backing the post-sign-in redirect policy.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// The path currently displayed to the user.
    fn current_path(&self) -> String;

    /// Navigate the user to a new path.
    fn navigate(&self, path: &str);
}
