//! Rate Limiting System
//!
//! Fixed-window rate limiting keyed by caller identity and endpoint class,
//! with an escalating IP block list, a bounded security event log, and a
//! cron-driven cleanup sweeper.

mod api;
mod blocklist;
mod config;
mod error;
mod events;
mod extractors;
mod limiter;
mod middleware;
mod sweeper;

pub use api::{ClassStanding, IpStatus, QuotaStatus, SecurityApi, SecurityStats};
pub use blocklist::{
	BlockEntry, BlockReason, IpBlockList, AUTO_BLOCK_SECS, MANUAL_BLOCK_SECS, VIOLATIONS_TO_BLOCK,
};
pub use config::{ClassLimit, EndpointClass, RateLimitConfig};
pub use error::RateLimitError;
pub use events::{
	EventCounts, SecurityEvent, SecurityEventKind, SecurityEventLog, DEFAULT_REPORT_LIMIT,
	DEFAULT_WINDOW_SECS, MAX_EVENTS,
};
pub use extractors::{extract_client_ip, ClientIp, IdentityKey, ServerMode};
pub use limiter::{RateLimitManager, WindowRecord};
pub use middleware::RateLimitLayer;
pub use sweeper::{spawn_sweeper, CronSchedule, DEFAULT_SWEEP_SCHEDULE};

// vim: ts=4
