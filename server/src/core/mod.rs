//! Core subsystem. App state, builder and route authentication.

pub mod app;
pub mod route_auth;

pub use nebulax_core::extract::{Auth, AuthCtx, OptionalAuth};

// vim: ts=4
