//! HTTP adapter: request/response mapping for the verification endpoint
//! and operational probes.

pub mod cors;
pub mod health;
pub mod state;
pub mod verify;
