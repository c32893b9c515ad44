//! Read-only adapters over the trusted data API.
//!
//! Both stores query PostgREST-style endpoints with the privileged service
//! key, so row-level policies on the public tables cannot mask the
//! authoritative rows.

pub mod profile_store;
pub mod role_store;

pub use profile_store::RestProfileStore;
pub use role_store::RestRoleStore;
