//! Session snapshot and auth event vocabulary.
//!
//! The resolver owns the live session; every other component reads an
//! immutable [`SessionSnapshot`] published through a watch channel and never
//! mutates it directly.

use serde::Serialize;

use super::identity::{Identity, UserId};
use super::role::Role;

/// Auth-state change emitted by the auth transport.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// A fresh interactive sign-in completed.
    SignedIn(UserId),
    /// A previously persisted session was restored silently.
    SessionRestored(UserId),
    /// The session ended through sign-out or token invalidation.
    SignedOut,
}

/// Published view of the current session.
///
/// ## Invariants
/// - `loading` is true only between resolver start and the first settled
///   resolution; consumers must treat it as a third state distinct from
///   "unauthenticated".
/// - A present `identity` is always complete; partial identities are never
///   exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    identity: Option<Identity>,
    role: Option<Role>,
    loading: bool,
}

impl SessionSnapshot {
    /// Initial state while the first resolution is still in flight.
    #[must_use]
    pub const fn resolving() -> Self {
        Self {
            identity: None,
            role: None,
            loading: true,
        }
    }

    /// Settled state with no authenticated identity.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            identity: None,
            role: None,
            loading: false,
        }
    }

    /// Settled state for a resolved identity and role.
    #[must_use]
    pub const fn signed_in(identity: Identity, role: Role) -> Self {
        Self {
            identity: Some(identity),
            role: Some(role),
            loading: false,
        }
    }

    /// Settled state from whatever the lookups yielded.
    ///
    /// A failed profile lookup publishes `identity: None` while the resolved
    /// role may still be present; the guard requires an identity, so a role
    /// alone grants nothing.
    #[must_use]
    pub const fn settled(identity: Option<Identity>, role: Option<Role>) -> Self {
        Self {
            identity,
            role,
            loading: false,
        }
    }

    /// The resolved identity, when one is present.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The resolved role, when one is present.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// True while the first resolution has not settled.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// True when a complete identity is exposed.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
