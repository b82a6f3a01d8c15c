//! NebulaX Security Gateway
//!
//! Rate limiting and abuse protection front for the NebulaX exchange API.
//!
//! # Features
//!
//! - Per-class fixed-window rate limiting
//!		- endpoint classes with independent quotas (auth, trading, withdrawal, market, admin)
//!		- identity preference: authenticated user, then client IP, then a shared bucket
//!	- Violation escalation with timed IP blocks
//!	- Bounded in-memory security event log
//!	- Operator API for blocks, events, statistics and per-IP status
//!	- Periodic cleanup sweeper

#![forbid(unsafe_code)]

pub mod auth;
pub mod core;
pub mod market;
pub mod prelude;
pub mod routes;
pub mod security;
pub mod trading;

pub use crate::core::app::{App, AppBuilder, AppState};
pub use nebulax_core::rate_limit::ServerMode;

// vim: ts=4
