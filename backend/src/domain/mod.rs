//! Domain core of the authorisation boundary.
//!
//! Purpose: define the role vocabulary, identity and session aggregates,
//! the ports the domain consumes, and the three cooperating services —
//! session resolver, route guard, and role verifier. Everything here is
//! transport agnostic; inbound and outbound adapters map to HTTP on either
//! side.
//!
//! Public surface:
//! - [`Role`] / [`RoleSet`] — canonical role vocabulary and requested sets.
//! - [`Identity`], [`UserId`], [`Email`] — authenticated principal.
//! - [`SessionSnapshot`] / [`AuthEvent`] — published session state.
//! - [`SessionResolver`] — event-driven owner of the session.
//! - [`RouteGuard`] / [`GuardOutcome`] — render gating.
//! - [`RoleVerifier`] / [`AccessDecision`] — server-side recheck.

pub mod auth;
pub mod identity;
pub mod ports;
pub mod role;
pub mod role_verifier;
pub mod route_guard;
pub mod session;
pub mod session_resolver;

pub use self::auth::{BearerToken, BearerTokenError};
pub use self::identity::{Email, Identity, IdentityValidationError, UserId};
pub use self::role::{Role, RoleSet};
pub use self::role_verifier::{AccessDecision, RoleVerifier, VerifyError};
pub use self::route_guard::{GuardOutcome, RouteGuard};
pub use self::session::{AuthEvent, SessionSnapshot};
pub use self::session_resolver::{LOGIN_PATH, SessionResolver, post_sign_in_redirect};
