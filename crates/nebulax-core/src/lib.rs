//! Security core for the NebulaX exchange gateway.
//!
//! This crate contains the security subsystem shared by the server crate:
//! fixed-window request counters keyed by caller identity and endpoint
//! class, the IP block list with violation escalation, the bounded
//! security event log, and the cron-driven cleanup sweeper.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod extract;
pub mod prelude;
pub mod rate_limit;

pub use extract::{Auth, AuthCtx, OptionalAuth};

// vim: ts=4
