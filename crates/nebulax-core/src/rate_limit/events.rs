//! Security Event Log
//!
//! Bounded in-memory log of security events. Retention is FIFO with a hard
//! cap; per-kind totals are monotonic and survive eviction.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use nebulax_types::types::{self, Timestamp};

/// Hard retention cap; oldest events are dropped first
pub const MAX_EVENTS: usize = 10_000;
/// Default report window when the caller does not specify one
pub const DEFAULT_WINDOW_SECS: i64 = 86_400;
/// Default report size cap
pub const DEFAULT_REPORT_LIMIT: usize = 100;

/// Kind of security event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
	/// An identity exhausted its quota and entered the blocked state
	RateLimitExceeded,
	/// An IP crossed the violation escalation threshold
	SuspiciousActivity,
	/// Anonymous flood traffic tripped the shared fallback bucket
	DdosAttempt,
}

/// Immutable record of a security event
#[skip_serializing_none]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
	pub event_id: Uuid,
	pub kind: SecurityEventKind,
	pub source_ip: Option<IpAddr>,
	pub user_id: Option<Box<str>>,
	pub at: Timestamp,
	pub details: serde_json::Map<String, serde_json::Value>,
}

impl SecurityEvent {
	pub fn new(
		kind: SecurityEventKind,
		source_ip: Option<IpAddr>,
		user_id: Option<Box<str>>,
		details: serde_json::Map<String, serde_json::Value>,
	) -> Self {
		Self { event_id: Uuid::new_v4(), kind, source_ip, user_id, at: types::now(), details }
	}
}

/// Monotonic per-kind event totals
#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCounts {
	pub rate_limit_exceeded: u64,
	pub suspicious_activity: u64,
	pub ddos_attempt: u64,
}

/// Bounded FIFO log of security events
pub struct SecurityEventLog {
	events: RwLock<VecDeque<SecurityEvent>>,
	rate_limit_exceeded: AtomicU64,
	suspicious_activity: AtomicU64,
	ddos_attempt: AtomicU64,
}

impl SecurityEventLog {
	pub fn new() -> Self {
		Self {
			events: RwLock::new(VecDeque::with_capacity(1024)),
			rate_limit_exceeded: AtomicU64::new(0),
			suspicious_activity: AtomicU64::new(0),
			ddos_attempt: AtomicU64::new(0),
		}
	}

	pub fn record(&self, event: SecurityEvent) {
		match event.kind {
			SecurityEventKind::RateLimitExceeded => {
				self.rate_limit_exceeded.fetch_add(1, Ordering::Relaxed);
			}
			SecurityEventKind::SuspiciousActivity => {
				self.suspicious_activity.fetch_add(1, Ordering::Relaxed);
			}
			SecurityEventKind::DdosAttempt => {
				self.ddos_attempt.fetch_add(1, Ordering::Relaxed);
			}
		}

		let mut events = self.events.write();
		if events.len() >= MAX_EVENTS {
			events.pop_front();
		}
		events.push_back(event);
	}

	/// Events within the last `window_secs`, newest first, capped at `limit`
	pub fn recent(&self, window_secs: i64, limit: usize) -> Vec<SecurityEvent> {
		let cutoff = Timestamp(types::now().0 - window_secs);
		let events = self.events.read();
		events.iter().rev().filter(|e| e.at >= cutoff).take(limit).cloned().collect()
	}

	pub fn counts(&self) -> EventCounts {
		EventCounts {
			rate_limit_exceeded: self.rate_limit_exceeded.load(Ordering::Relaxed),
			suspicious_activity: self.suspicious_activity.load(Ordering::Relaxed),
			ddos_attempt: self.ddos_attempt.load(Ordering::Relaxed),
		}
	}

	pub fn len(&self) -> usize {
		self.events.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.read().is_empty()
	}
}

impl Default for SecurityEventLog {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
