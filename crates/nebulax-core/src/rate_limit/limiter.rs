//! Rate Limit Manager
//!
//! Fixed-window request counting keyed by (identity, endpoint class).
//! Composes the IP block list and the security event log: quota overflow
//! blocks the window for twice its length, counts a violation against the
//! source IP, and records an event on the transition into the blocked
//! state.

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use lru::LruCache;
use parking_lot::RwLock;

use super::api::{ClassStanding, IpStatus, QuotaStatus, SecurityApi, SecurityStats};
use super::blocklist::{BlockEntry, BlockReason, IpBlockList, VIOLATIONS_TO_BLOCK};
use super::config::{EndpointClass, RateLimitConfig};
use super::error::RateLimitError;
use super::events::{SecurityEvent, SecurityEventKind, SecurityEventLog};
use super::extractors::IdentityKey;
use crate::prelude::*;

/// Request counter for one (identity, class) window
#[derive(Debug, Clone)]
pub struct WindowRecord {
	/// Requests accepted in the current window
	pub count: u32,
	/// When the current window ends
	pub window_reset_at: Instant,
	/// Whether the record is in the blocked state
	pub blocked: bool,
	/// When the block lifts
	pub blocked_until: Option<Instant>,
}

impl WindowRecord {
	fn new(window_reset_at: Instant) -> Self {
		Self { count: 0, window_reset_at, blocked: false, blocked_until: None }
	}

	/// A record is dead once its window has passed and no block is pending
	fn is_expired(&self, now: Instant) -> bool {
		match self.blocked_until {
			Some(until) => now >= until,
			None => now >= self.window_reset_at,
		}
	}
}

/// Main security manager: windows, block list, event log
pub struct RateLimitManager {
	config: RateLimitConfig,
	windows: RwLock<LruCache<(IdentityKey, EndpointClass), WindowRecord>>,
	blocks: IpBlockList,
	events: SecurityEventLog,
	total_limited: AtomicU64,
}

impl RateLimitManager {
	pub fn new(config: RateLimitConfig) -> Self {
		const DEFAULT_CAP: NonZeroUsize = match NonZeroUsize::new(100_000) {
			Some(v) => v,
			None => unreachable!(),
		};
		let window_cap = NonZeroUsize::new(config.max_tracked_windows).unwrap_or(DEFAULT_CAP);
		let blocks = IpBlockList::new(config.max_tracked_windows);

		Self {
			windows: RwLock::new(LruCache::new(window_cap)),
			blocks,
			events: SecurityEventLog::new(),
			total_limited: AtomicU64::new(0),
			config,
		}
	}

	pub fn config(&self) -> &RateLimitConfig {
		&self.config
	}

	/// Check whether a request may proceed.
	///
	/// The block list is consulted first; a blocked source IP is denied
	/// regardless of identity or class. Traffic with no derivable identity
	/// shares one conservative bucket under the general class.
	pub fn check(
		&self,
		identity: &IdentityKey,
		source_ip: Option<IpAddr>,
		class: EndpointClass,
	) -> Result<QuotaStatus, RateLimitError> {
		if let Some(ip) = source_ip {
			if let Some(block) = self.blocks.active_block(&ip) {
				self.total_limited.fetch_add(1, Ordering::Relaxed);
				let remaining = block.remaining();
				return Err(match block.reason {
					BlockReason::Manual { .. } => RateLimitError::ManuallyBlocked { remaining },
					BlockReason::RepeatedViolations => {
						RateLimitError::TemporarilyBlocked { remaining }
					}
				});
			}
		}

		let class = if *identity == IdentityKey::Global { EndpointClass::General } else { class };
		let limit = *self.config.limit_for(class);
		let window = limit.window();
		let now = Instant::now();

		let transitioned = {
			let mut windows = self.windows.write();
			let record = windows
				.get_or_insert_mut((identity.clone(), class), || WindowRecord::new(now + window));

			if let Some(until) = record.blocked_until {
				if now < until {
					// denied requests do not increment the counter
					self.total_limited.fetch_add(1, Ordering::Relaxed);
					return Err(RateLimitError::QuotaExceeded {
						class,
						limit: limit.max_requests,
						retry_after: until - now,
					});
				}
				record.blocked = false;
				record.blocked_until = None;
				record.count = 0;
				record.window_reset_at = now + window;
			}

			if now >= record.window_reset_at {
				record.count = 0;
				record.window_reset_at = now + window;
			}

			if record.count >= limit.max_requests {
				let until = now + 2 * window;
				record.blocked = true;
				record.blocked_until = Some(until);
				true
			} else {
				record.count += 1;
				let remaining = limit.max_requests - record.count;
				let reset_after = record.window_reset_at.saturating_duration_since(now);
				return Ok(QuotaStatus { limit: limit.max_requests, remaining, reset_after });
			}
		};

		if transitioned {
			self.total_limited.fetch_add(1, Ordering::Relaxed);
			self.on_limit_exceeded(identity, source_ip, class);
		}

		Err(RateLimitError::QuotaExceeded {
			class,
			limit: limit.max_requests,
			retry_after: 2 * window,
		})
	}

	/// Violation and event bookkeeping for a window entering the blocked
	/// state. Called once per transition, not per denied request.
	fn on_limit_exceeded(
		&self,
		identity: &IdentityKey,
		source_ip: Option<IpAddr>,
		class: EndpointClass,
	) {
		let user_id = match identity {
			IdentityKey::User(id) => Some(id.clone()),
			_ => None,
		};
		let kind = if *identity == IdentityKey::Global {
			SecurityEventKind::DdosAttempt
		} else {
			SecurityEventKind::RateLimitExceeded
		};

		let mut details = serde_json::Map::new();
		details.insert("class".into(), serde_json::Value::from(class.as_str()));
		self.events.record(SecurityEvent::new(kind, source_ip, user_id, details));
		warn!(identity = %identity, class = %class, "Rate limit exceeded");

		if let Some(ip) = source_ip {
			self.count_violation(ip);
		}
	}

	/// Count a violation against an IP from outside the limiter path, e.g.
	/// a failed login attempt. Escalation behaves as for quota violations.
	pub fn penalize(&self, ip: IpAddr) {
		self.count_violation(ip);
	}

	fn count_violation(&self, ip: IpAddr) {
		if let Some(block) = self.blocks.track_violation(&ip) {
			let mut details = serde_json::Map::new();
			details.insert("violations".into(), serde_json::Value::from(VIOLATIONS_TO_BLOCK));
			details.insert("blockedUntil".into(), serde_json::Value::from(block.expires_at.0));
			self.events.record(SecurityEvent::new(
				SecurityEventKind::SuspiciousActivity,
				Some(ip),
				None,
				details,
			));
			warn!(ip = %ip, "IP blocked after repeated violations");
		}
	}

	/// Remove expired window records and expired block entries.
	/// Blocked records are retained until their block lifts.
	pub fn sweep(&self) -> (usize, usize) {
		let now = Instant::now();
		let removed = {
			let mut windows = self.windows.write();
			let expired: Vec<(IdentityKey, EndpointClass)> = windows
				.iter()
				.filter(|(_, record)| record.is_expired(now))
				.map(|(key, _)| key.clone())
				.collect();
			for key in &expired {
				windows.pop(key);
			}
			expired.len()
		};
		let pruned = self.blocks.prune_expired();
		(removed, pruned)
	}
}

impl Default for RateLimitManager {
	fn default() -> Self {
		Self::new(RateLimitConfig::default())
	}
}

impl SecurityApi for RateLimitManager {
	fn recent_events(&self, window_secs: i64, limit: usize) -> Vec<SecurityEvent> {
		self.events.recent(window_secs, limit)
	}

	fn list_blocks(&self) -> Vec<BlockEntry> {
		self.blocks.list()
	}

	fn block_ip(&self, ip: IpAddr, note: &str) -> ApiResult<BlockEntry> {
		let entry = self.blocks.block_manual(ip, note);
		info!(ip = %ip, "IP manually blocked: {}", note);
		Ok(entry)
	}

	fn unblock_ip(&self, ip: IpAddr) -> ApiResult<()> {
		if self.blocks.unblock(&ip) {
			info!(ip = %ip, "IP unblocked");
			Ok(())
		} else {
			Err(Error::NotFound)
		}
	}

	fn is_blocked(&self, ip: IpAddr) -> bool {
		self.blocks.is_blocked(&ip)
	}

	fn stats(&self) -> SecurityStats {
		SecurityStats {
			tracked_windows: self.windows.read().len(),
			active_blocks: self.blocks.active_count(),
			total_requests_limited: self.total_limited.load(Ordering::Relaxed),
			total_blocks_issued: self.blocks.total_blocks_issued(),
			events: self.events.counts(),
		}
	}

	fn status(&self, ip: IpAddr) -> IpStatus {
		let blocked = self.blocks.active_block(&ip);
		let violations = self.blocks.violations(&ip);
		let now = Instant::now();

		let windows = self.windows.read();
		let classes = EndpointClass::ALL
			.iter()
			.map(|&class| {
				let limit = self.config.limit_for(class);
				let (used, resets_in_secs) = windows
					.peek(&(IdentityKey::Ip(ip), class))
					.filter(|record| now < record.window_reset_at)
					.map(|record| {
						(record.count, (record.window_reset_at - now).as_secs())
					})
					.unwrap_or((0, 0));
				ClassStanding { class, used, limit: limit.max_requests, resets_in_secs }
			})
			.collect();

		IpStatus { blocked, violations, classes }
	}
}


// vim: ts=4
