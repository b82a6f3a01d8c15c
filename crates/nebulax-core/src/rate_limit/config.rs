//! Rate Limiting Configuration
//!
//! Per-class fixed-window limits. The defaults carry the production limit
//! table; operators can override individual classes from a YAML file.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::RateLimitError;

/// Endpoint classes with distinct rate limit policies
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointClass {
	/// Login and credential endpoints
	Auth,
	/// Order placement and cancellation
	Trading,
	/// Withdrawal submission
	Withdrawal,
	/// Market data reads
	Market,
	/// Operator tooling
	Admin,
	/// Everything else, also the anonymous fallback bucket
	General,
}

impl EndpointClass {
	pub const ALL: [EndpointClass; 6] = [
		EndpointClass::Auth,
		EndpointClass::Trading,
		EndpointClass::Withdrawal,
		EndpointClass::Market,
		EndpointClass::Admin,
		EndpointClass::General,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			EndpointClass::Auth => "auth",
			EndpointClass::Trading => "trading",
			EndpointClass::Withdrawal => "withdrawal",
			EndpointClass::Market => "market",
			EndpointClass::Admin => "admin",
			EndpointClass::General => "general",
		}
	}
}

impl std::fmt::Display for EndpointClass {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EndpointClass {
	type Err = RateLimitError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"auth" => Ok(EndpointClass::Auth),
			"trading" => Ok(EndpointClass::Trading),
			"withdrawal" => Ok(EndpointClass::Withdrawal),
			"market" => Ok(EndpointClass::Market),
			"admin" => Ok(EndpointClass::Admin),
			"general" => Ok(EndpointClass::General),
			other => Err(RateLimitError::UnknownClass(other.to_string())),
		}
	}
}

/// Fixed-window limit for a single endpoint class
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassLimit {
	/// Maximum requests per window
	pub max_requests: u32,
	/// Window length in seconds
	pub window_secs: u64,
}

impl ClassLimit {
	pub fn new(max_requests: u32, window_secs: u64) -> Self {
		Self { max_requests, window_secs }
	}

	pub fn window(&self) -> Duration {
		Duration::from_secs(self.window_secs)
	}
}

/// Main rate limit configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateLimitConfig {
	pub auth: ClassLimit,
	pub trading: ClassLimit,
	pub withdrawal: ClassLimit,
	pub market: ClassLimit,
	pub admin: ClassLimit,
	pub general: ClassLimit,
	/// Maximum number of identity/class windows to track (memory limit)
	pub max_tracked_windows: usize,
}

impl Default for RateLimitConfig {
	fn default() -> Self {
		Self {
			auth: ClassLimit::new(5, 900),
			trading: ClassLimit::new(100, 60),
			withdrawal: ClassLimit::new(10, 300),
			market: ClassLimit::new(300, 60),
			admin: ClassLimit::new(60, 60),
			general: ClassLimit::new(120, 60),
			max_tracked_windows: 100_000,
		}
	}
}

impl RateLimitConfig {
	pub fn limit_for(&self, class: EndpointClass) -> &ClassLimit {
		match class {
			EndpointClass::Auth => &self.auth,
			EndpointClass::Trading => &self.trading,
			EndpointClass::Withdrawal => &self.withdrawal,
			EndpointClass::Market => &self.market,
			EndpointClass::Admin => &self.admin,
			EndpointClass::General => &self.general,
		}
	}
}


// vim: ts=4
