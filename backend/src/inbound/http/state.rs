//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::RoleVerifier;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Server-side role verification service.
    pub verifier: Arc<RoleVerifier>,
}

impl HttpState {
    /// Bundle the services the HTTP layer depends on.
    #[must_use]
    pub const fn new(verifier: Arc<RoleVerifier>) -> Self {
        Self { verifier }
    }
}
