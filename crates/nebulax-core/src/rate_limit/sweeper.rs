//! Cleanup Sweeper
//!
//! Periodic background task that prunes expired rate limit windows and
//! block entries. Runs on a cron schedule, every five minutes by default.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use croner::Cron;
use tokio::task::JoinHandle;

use super::limiter::RateLimitManager;
use crate::prelude::*;

/// Sweep every five minutes
pub const DEFAULT_SWEEP_SCHEDULE: &str = "*/5 * * * *";

/// Fallback wait when the schedule cannot produce a next occurrence
const FALLBACK_WAIT_SECS: u64 = 300;

/// Cron schedule wrapper using the croner crate
/// Stores the expression string for serialization
#[derive(Debug, Clone)]
pub struct CronSchedule {
	/// The original cron expression string
	expr: Box<str>,
	/// Parsed cron object
	cron: Cron,
}

impl CronSchedule {
	/// Parse a cron expression (5 fields: minute hour day month weekday)
	pub fn parse(expr: &str) -> ApiResult<Self> {
		let cron = Cron::from_str(expr)
			.map_err(|e| Error::ValidationError(format!("invalid cron expression: {}", e)))?;
		Ok(Self { expr: expr.into(), cron })
	}

	/// Calculate the next execution time after the given timestamp
	///
	/// Returns an error if no next occurrence can be found (should be rare
	/// for valid expressions within reasonable time bounds).
	pub fn next_execution(&self, after: Timestamp) -> ApiResult<Timestamp> {
		let dt = DateTime::<Utc>::from_timestamp(after.0, 0).unwrap_or_else(Utc::now);

		self.cron
			.find_next_occurrence(&dt, false)
			.map(|next| Timestamp(next.timestamp()))
			.map_err(|e| {
				tracing::error!("Failed to find next cron occurrence for '{}': {}", self.expr, e);
				Error::ValidationError(format!("cron next_execution failed: {}", e))
			})
	}

	/// Convert back to cron expression string
	pub fn to_cron_string(&self) -> String {
		self.expr.to_string()
	}
}

impl PartialEq for CronSchedule {
	fn eq(&self, other: &Self) -> bool {
		self.expr == other.expr
	}
}

impl Eq for CronSchedule {}

/// Spawn the background sweeper task
///
/// The task runs until the handle is aborted or the runtime shuts down.
pub fn spawn_sweeper(manager: Arc<RateLimitManager>, schedule: CronSchedule) -> JoinHandle<()> {
	tokio::spawn(async move {
		info!("Security sweeper started with schedule '{}'", schedule.to_cron_string());
		loop {
			let now = nebulax_types::types::now();
			let wait_secs = match schedule.next_execution(now) {
				Ok(next) => (next.0 - now.0).max(1) as u64,
				Err(err) => {
					error!("Sweeper schedule error: {}, retrying in {}s", err, FALLBACK_WAIT_SECS);
					FALLBACK_WAIT_SECS
				}
			};
			tokio::time::sleep(Duration::from_secs(wait_secs)).await;

			let (windows_removed, blocks_pruned) = manager.sweep();
			if windows_removed > 0 || blocks_pruned > 0 {
				info!(
					"Cleaned up {} expired rate limit windows, {} expired block entries",
					windows_removed, blocks_pruned
				);
			} else {
				debug!("Sweep found nothing to clean up");
			}
		}
	})
}


// vim: ts=4
