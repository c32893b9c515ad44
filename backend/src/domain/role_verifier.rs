//! Server-side, per-call role verification.
//!
//! The verifier is the authority of the authorisation boundary: it
//! re-derives the caller's role from the trusted store using a privileged
//! credential, never trusting any role claim carried in the caller's own
//! token or held by the client-side session.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use super::auth::BearerToken;
use super::identity::UserId;
use super::ports::{RoleStore, TokenAuthenticationError, TokenAuthenticator};
use super::role::{Role, RoleSet};

/// Per-call authorisation decision.
///
/// Not persisted; returned synchronously to the caller for a single request.
/// A denial on role mismatch is a successful verification that decided
/// "no" — only authentication and store failures are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    authorized: bool,
    user_id: UserId,
    role: Option<Role>,
    reason: Option<String>,
}

impl AccessDecision {
    /// Build a granting decision.
    #[must_use]
    pub fn granted(user_id: UserId, role: Option<Role>, reason: Option<String>) -> Self {
        Self {
            authorized: true,
            user_id,
            role,
            reason,
        }
    }

    /// Build a denying decision for a role mismatch.
    #[must_use]
    pub fn denied(user_id: UserId, role: Role, reason: impl Into<String>) -> Self {
        Self {
            authorized: false,
            user_id,
            role: Some(role),
            reason: Some(reason.into()),
        }
    }

    /// Whether the caller is admitted.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// The authenticated caller's id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The resolved role; absent for authentication-only checks, which skip
    /// the privileged lookup entirely.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Human-readable explanation of the decision, when one was recorded.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Failures of a verification call.
///
/// Callers must fail closed: any error is treated as "not authorized".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The bearer credential is missing, malformed, expired, or could not
    /// be validated; terminal for the call, never retried automatically.
    #[error("authentication failed: {message}")]
    Unauthenticated { message: String },
    /// The trusted role store lookup itself failed; distinct from "no row
    /// found", which is not an error.
    #[error("role store lookup failed: {message}")]
    StoreFailure { message: String },
}

impl VerifyError {
    /// Helper for authentication failures.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Helper for store lookup failures.
    pub fn store_failure(message: impl Into<String>) -> Self {
        Self::StoreFailure {
            message: message.into(),
        }
    }
}

/// Stateless, per-call role verification service.
///
/// Safe to invoke repeatedly and concurrently for the same identity: the
/// operation is read-only and idempotent.
pub struct RoleVerifier {
    authenticator: Arc<dyn TokenAuthenticator>,
    roles: Arc<dyn RoleStore>,
}

impl RoleVerifier {
    /// Build a verifier over the trusted auth service and role store.
    ///
    /// The role store handle must be the privileged (service-level) one;
    /// lookups key strictly on the authenticated caller's own id, never an
    /// id supplied in the request.
    #[must_use]
    pub fn new(authenticator: Arc<dyn TokenAuthenticator>, roles: Arc<dyn RoleStore>) -> Self {
        Self {
            authenticator,
            roles,
        }
    }

    /// Authenticate the bearer credential and decide admission against the
    /// requested role set.
    ///
    /// An empty role set makes this an authentication-only check: admission
    /// is granted unconditionally once the credential validates, and the
    /// privileged role lookup is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Unauthenticated`] when the credential does not
    /// validate (including when the auth service is unreachable, which fails
    /// closed) and [`VerifyError::StoreFailure`] when the role lookup errors.
    pub async fn verify(
        &self,
        token: &BearerToken,
        required: &RoleSet,
    ) -> Result<AccessDecision, VerifyError> {
        let user_id = self
            .authenticator
            .authenticate(token)
            .await
            .map_err(|err| match err {
                TokenAuthenticationError::InvalidToken { message } => {
                    debug!(%message, "bearer credential rejected");
                    VerifyError::unauthenticated(message)
                }
                TokenAuthenticationError::Unavailable { message } => {
                    error!(%message, "auth service unavailable during verification");
                    VerifyError::unauthenticated(message)
                }
            })?;

        if required.is_empty() {
            debug!(%user_id, "authentication-only check passed");
            return Ok(AccessDecision::granted(
                user_id,
                None,
                Some("authentication check passed".to_owned()),
            ));
        }

        let role = self
            .roles
            .find_by_user_id(&user_id)
            .await
            .map_err(|err| {
                error!(%err, %user_id, "role store lookup failed");
                VerifyError::store_failure(err.to_string())
            })?
            .unwrap_or(Role::Client);

        if required.contains(role) {
            debug!(%user_id, %role, "role verification granted");
            Ok(AccessDecision::granted(user_id, Some(role), None))
        } else {
            debug!(%user_id, %role, required = ?required.roles(), "role verification denied");
            Ok(AccessDecision::denied(
                user_id,
                role,
                "insufficient permissions",
            ))
        }
    }
}
