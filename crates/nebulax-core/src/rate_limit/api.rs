//! Security Internal API
//!
//! Trait and types for programmatic security management, consumed by the
//! operator endpoints in the server crate.

use std::net::IpAddr;
use std::time::Duration;

use serde::Serialize;
use serde_with::skip_serializing_none;

use super::blocklist::BlockEntry;
use super::config::EndpointClass;
use super::events::{EventCounts, SecurityEvent};
use nebulax_types::error::ApiResult;

/// Quota standing returned by a successful limiter check
#[derive(Clone, Copy, Debug)]
pub struct QuotaStatus {
	/// Quota for the window
	pub limit: u32,
	/// Requests left in the current window
	pub remaining: u32,
	/// Time until the window resets
	pub reset_after: Duration,
}

/// Window standing of one endpoint class for one IP
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStanding {
	pub class: EndpointClass,
	pub used: u32,
	pub limit: u32,
	pub resets_in_secs: u64,
}

/// Status report for a single IP
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpStatus {
	pub blocked: Option<BlockEntry>,
	pub violations: u32,
	pub classes: Vec<ClassStanding>,
}

/// Statistics about the security subsystem
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStats {
	/// Identity/class windows currently tracked
	pub tracked_windows: usize,
	/// Block entries that have not expired
	pub active_blocks: usize,
	/// Requests denied since startup
	pub total_requests_limited: u64,
	/// Blocks issued since startup
	pub total_blocks_issued: u64,
	/// Monotonic per-kind event totals
	pub events: EventCounts,
}

/// Internal API for programmatic security management
pub trait SecurityApi: Send + Sync {
	/// Recent security events, newest first
	fn recent_events(&self, window_secs: i64, limit: usize) -> Vec<SecurityEvent>;

	/// Currently active block entries
	fn list_blocks(&self) -> Vec<BlockEntry>;

	/// Manually block an IP for 24 hours
	fn block_ip(&self, ip: IpAddr, note: &str) -> ApiResult<BlockEntry>;

	/// Lift a block early
	fn unblock_ip(&self, ip: IpAddr) -> ApiResult<()>;

	/// Check if an IP is currently blocked
	fn is_blocked(&self, ip: IpAddr) -> bool;

	/// Statistics about the security subsystem state
	fn stats(&self) -> SecurityStats;

	/// Per-IP status across all endpoint classes
	fn status(&self, ip: IpAddr) -> IpStatus;
}

// vim: ts=4
