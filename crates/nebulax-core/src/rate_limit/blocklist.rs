//! IP Block List
//!
//! Tracks per-IP rate limit violations and escalates repeat offenders into
//! timed blocks. Expiry is lazy: entries are compared against the clock on
//! read and pruned in bulk by the sweeper. No timers are armed per block.

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lru::LruCache;
use parking_lot::RwLock;
use serde::Serialize;

use nebulax_types::types::{self, Timestamp};

/// Violations before an automatic block
pub const VIOLATIONS_TO_BLOCK: u32 = 5;
/// Automatic block duration in seconds
pub const AUTO_BLOCK_SECS: i64 = 3_600;
/// Manual block duration in seconds
pub const MANUAL_BLOCK_SECS: i64 = 86_400;

/// Why an IP was blocked
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
	/// Crossed the violation escalation threshold
	RepeatedViolations,
	/// Blocked by an operator, with their stated reason
	Manual { note: Box<str> },
}

impl BlockReason {
	/// Block duration for this reason, in seconds
	pub fn duration_secs(&self) -> i64 {
		match self {
			BlockReason::RepeatedViolations => AUTO_BLOCK_SECS,
			BlockReason::Manual { .. } => MANUAL_BLOCK_SECS,
		}
	}
}

/// Block entry stored in the block list
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEntry {
	pub ip: IpAddr,
	pub reason: BlockReason,
	pub created_at: Timestamp,
	pub expires_at: Timestamp,
}

impl BlockEntry {
	/// Check if this block has expired
	pub fn is_expired(&self) -> bool {
		types::now() >= self.expires_at
	}

	/// Remaining duration until the block expires
	pub fn remaining(&self) -> Duration {
		let secs = (self.expires_at.0 - types::now().0).max(0);
		Duration::from_secs(secs as u64)
	}
}

/// Block list with per-IP violation counters
pub struct IpBlockList {
	blocks: RwLock<LruCache<IpAddr, BlockEntry>>,
	violations: RwLock<LruCache<IpAddr, u32>>,
	total_blocks: AtomicU64,
}

impl IpBlockList {
	pub fn new(max_tracked: usize) -> Self {
		const TEN_THOUSAND: NonZeroUsize = match NonZeroUsize::new(10_000) {
			Some(v) => v,
			None => unreachable!(),
		};
		const TWENTY_THOUSAND: NonZeroUsize = match NonZeroUsize::new(20_000) {
			Some(v) => v,
			None => unreachable!(),
		};
		let block_cap = NonZeroUsize::new(max_tracked / 10).unwrap_or(TEN_THOUSAND);
		let violation_cap = NonZeroUsize::new(max_tracked / 5).unwrap_or(TWENTY_THOUSAND);

		Self {
			blocks: RwLock::new(LruCache::new(block_cap)),
			violations: RwLock::new(LruCache::new(violation_cap)),
			total_blocks: AtomicU64::new(0),
		}
	}

	/// Active block for an IP. An expired entry is dropped on read and its
	/// violation counter is reset.
	pub fn active_block(&self, ip: &IpAddr) -> Option<BlockEntry> {
		let mut blocks = self.blocks.write();
		if let Some(entry) = blocks.get(ip) {
			if entry.is_expired() {
				blocks.pop(ip);
				drop(blocks);
				self.violations.write().pop(ip);
				return None;
			}
			return Some(entry.clone());
		}
		None
	}

	pub fn is_blocked(&self, ip: &IpAddr) -> bool {
		self.active_block(ip).is_some()
	}

	/// Count a violation for an IP; returns the new block entry when the
	/// escalation threshold is reached.
	pub fn track_violation(&self, ip: &IpAddr) -> Option<BlockEntry> {
		let count = {
			let mut violations = self.violations.write();
			let entry = violations.get_or_insert_mut(*ip, || 0);
			*entry = entry.saturating_add(1);
			*entry
		};

		if count >= VIOLATIONS_TO_BLOCK {
			Some(self.block(*ip, BlockReason::RepeatedViolations))
		} else {
			None
		}
	}

	/// Operator block with a stated reason, lasting 24 hours
	pub fn block_manual(&self, ip: IpAddr, note: &str) -> BlockEntry {
		self.block(ip, BlockReason::Manual { note: note.into() })
	}

	fn block(&self, ip: IpAddr, reason: BlockReason) -> BlockEntry {
		let created_at = types::now();
		let expires_at = created_at.add_secs(reason.duration_secs());
		let entry = BlockEntry { ip, reason, created_at, expires_at };
		self.blocks.write().put(ip, entry.clone());
		self.total_blocks.fetch_add(1, Ordering::Relaxed);
		entry
	}

	/// Lift a block early; clears the violation counter as well.
	/// Returns false if the IP was not blocked.
	pub fn unblock(&self, ip: &IpAddr) -> bool {
		self.violations.write().pop(ip);
		self.blocks.write().pop(ip).is_some()
	}

	/// Current violation count for an IP
	pub fn violations(&self, ip: &IpAddr) -> u32 {
		self.violations.read().peek(ip).copied().unwrap_or(0)
	}

	/// All currently active block entries
	pub fn list(&self) -> Vec<BlockEntry> {
		self.blocks.read().iter().filter(|(_, b)| !b.is_expired()).map(|(_, b)| b.clone()).collect()
	}

	pub fn active_count(&self) -> usize {
		self.blocks.read().iter().filter(|(_, b)| !b.is_expired()).count()
	}

	pub fn total_blocks_issued(&self) -> u64 {
		self.total_blocks.load(Ordering::Relaxed)
	}

	/// Drop expired entries and their violation counters in one pass.
	/// Returns how many blocks were removed.
	pub fn prune_expired(&self) -> usize {
		let mut blocks = self.blocks.write();
		let expired: Vec<IpAddr> =
			blocks.iter().filter(|(_, b)| b.is_expired()).map(|(ip, _)| *ip).collect();
		for ip in &expired {
			blocks.pop(ip);
		}
		drop(blocks);

		let mut violations = self.violations.write();
		for ip in &expired {
			violations.pop(ip);
		}
		expired.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::net::Ipv4Addr;

	fn ip(last: u8) -> IpAddr {
		IpAddr::V4(Ipv4Addr::new(198, 51, 100, last))
	}

	#[test]
	fn four_violations_do_not_block() {
		let list = IpBlockList::new(100_000);
		for _ in 0..4 {
			assert!(list.track_violation(&ip(1)).is_none());
		}
		assert!(!list.is_blocked(&ip(1)));
		assert_eq!(list.violations(&ip(1)), 4);
	}

	#[test]
	fn fifth_violation_blocks_for_an_hour() {
		let list = IpBlockList::new(100_000);
		for _ in 0..4 {
			list.track_violation(&ip(2));
		}
		let entry = list.track_violation(&ip(2)).expect("fifth violation should block");
		assert!(list.is_blocked(&ip(2)));
		assert_eq!(entry.reason, BlockReason::RepeatedViolations);
		assert_eq!(entry.expires_at.0 - entry.created_at.0, AUTO_BLOCK_SECS);
	}

	#[test]
	fn violations_are_per_ip() {
		let list = IpBlockList::new(100_000);
		for _ in 0..4 {
			list.track_violation(&ip(3));
		}
		list.track_violation(&ip(4));
		assert_eq!(list.violations(&ip(3)), 4);
		assert_eq!(list.violations(&ip(4)), 1);
		assert!(!list.is_blocked(&ip(3)));
	}

	#[test]
	fn manual_block_lasts_a_day() {
		let list = IpBlockList::new(100_000);
		let entry = list.block_manual(ip(5), "withdrawal fraud pattern");
		assert!(list.is_blocked(&ip(5)));
		assert_eq!(entry.expires_at.0 - entry.created_at.0, MANUAL_BLOCK_SECS);
		assert!(matches!(entry.reason, BlockReason::Manual { .. }));
	}

	#[test]
	fn unblock_clears_violations() {
		let list = IpBlockList::new(100_000);
		for _ in 0..5 {
			list.track_violation(&ip(6));
		}
		assert!(list.is_blocked(&ip(6)));
		assert!(list.unblock(&ip(6)));
		assert!(!list.is_blocked(&ip(6)));
		assert_eq!(list.violations(&ip(6)), 0);
		// unblocking a clean IP reports false
		assert!(!list.unblock(&ip(7)));
	}

	#[test]
	fn expired_entry_is_dropped_on_read() {
		let list = IpBlockList::new(100_000);
		list.track_violation(&ip(8));
		// plant an already-expired block
		let past = types::now().add_secs(-10);
		let entry = BlockEntry {
			ip: ip(8),
			reason: BlockReason::RepeatedViolations,
			created_at: past.add_secs(-AUTO_BLOCK_SECS),
			expires_at: past,
		};
		list.blocks.write().put(ip(8), entry);

		assert!(!list.is_blocked(&ip(8)));
		// lazy expiry also reset the violation counter
		assert_eq!(list.violations(&ip(8)), 0);
	}

	#[test]
	fn prune_removes_only_expired() {
		let list = IpBlockList::new(100_000);
		list.block_manual(ip(9), "test");
		let past = types::now().add_secs(-1);
		let entry = BlockEntry {
			ip: ip(10),
			reason: BlockReason::RepeatedViolations,
			created_at: past.add_secs(-AUTO_BLOCK_SECS),
			expires_at: past,
		};
		list.blocks.write().put(ip(10), entry);

		assert_eq!(list.prune_expired(), 1);
		assert!(list.is_blocked(&ip(9)));
		assert_eq!(list.active_count(), 1);
	}

	#[test]
	fn list_skips_expired_entries() {
		let list = IpBlockList::new(100_000);
		list.block_manual(ip(11), "test");
		let past = types::now().add_secs(-1);
		list.blocks.write().put(
			ip(12),
			BlockEntry {
				ip: ip(12),
				reason: BlockReason::RepeatedViolations,
				created_at: past,
				expires_at: past,
			},
		);
		let active = list.list();
		assert_eq!(active.len(), 1);
		assert_eq!(active[0].ip, ip(11));
	}
}

// vim: ts=4
