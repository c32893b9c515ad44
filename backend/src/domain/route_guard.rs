//! Render gating for protected routes.
//!
//! The guard holds no state of its own: it re-evaluates the resolver's
//! current snapshot against a required role set every time the snapshot
//! changes.

use super::role::{Role, RoleSet};
use super::session::SessionSnapshot;
use super::session_resolver::LOGIN_PATH;

/// Outcome of evaluating a protected route against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Resolution is still in flight; render a neutral placeholder, never
    /// the protected content and never a redirect.
    Loading,
    /// The caller must be sent to the given path.
    Redirect(String),
    /// The protected content may render unchanged.
    Allow,
}

/// Declarative gate for one protected subtree.
///
/// # Examples
/// ```
/// use backend::domain::{GuardOutcome, Role, RoleSet, RouteGuard, SessionSnapshot};
///
/// let guard = RouteGuard::new(RoleSet::new([Role::Admin]));
/// assert_eq!(guard.evaluate(&SessionSnapshot::resolving()), GuardOutcome::Loading);
/// ```
#[derive(Debug, Clone)]
pub struct RouteGuard {
    required: RoleSet,
    fallback: String,
}

impl RouteGuard {
    /// Build a guard for the given acceptable roles with the login page as
    /// the fallback for unauthenticated visitors.
    #[must_use]
    pub fn new(required: RoleSet) -> Self {
        Self {
            required,
            fallback: LOGIN_PATH.to_owned(),
        }
    }

    /// Override the unauthenticated fallback path.
    #[must_use]
    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = path.into();
        self
    }

    /// Evaluate the guard against a session snapshot.
    ///
    /// An authenticated identity whose role is outside the required set is
    /// redirected to its own role's home, not treated as unauthenticated.
    #[must_use]
    pub fn evaluate(&self, snapshot: &SessionSnapshot) -> GuardOutcome {
        if snapshot.is_loading() {
            return GuardOutcome::Loading;
        }
        if !snapshot.is_authenticated() {
            return GuardOutcome::Redirect(self.fallback.clone());
        }
        let role = snapshot.role().unwrap_or(Role::Client);
        if self.required.is_empty() || self.required.contains(role) {
            GuardOutcome::Allow
        } else {
            GuardOutcome::Redirect(role.home_path().to_owned())
        }
    }
}
