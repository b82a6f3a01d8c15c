//! App state type

use std::net::SocketAddr;
use std::sync::Arc;

use crate::prelude::*;
use crate::routes;

use nebulax_core::rate_limit::{
	spawn_sweeper, CronSchedule, RateLimitConfig, RateLimitManager, SecurityApi, ServerMode,
	DEFAULT_SWEEP_SCHEDULE,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub limiter: Arc<RateLimitManager>,
	pub security: Arc<dyn SecurityApi>,
	pub opts: AppBuilderOpts,
}

pub type App = Arc<AppState>;

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub mode: ServerMode,
	pub listen: Box<str>,
	pub jwt_secret: Box<str>,
	pub sweep_schedule: Box<str>,
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	rate_limits: RateLimitConfig,
}

impl AppBuilder {
	pub fn new() -> Self {
		AppBuilder {
			opts: AppBuilderOpts {
				mode: ServerMode::Standalone,
				listen: "127.0.0.1:8080".into(),
				jwt_secret: "".into(),
				sweep_schedule: DEFAULT_SWEEP_SCHEDULE.into(),
			},
			rate_limits: RateLimitConfig::default(),
		}
	}

	// Opts
	pub fn mode(&mut self, mode: ServerMode) -> &mut Self { self.opts.mode = mode; self }
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self { self.opts.listen = listen.into(); self }
	pub fn jwt_secret(&mut self, jwt_secret: impl Into<Box<str>>) -> &mut Self { self.opts.jwt_secret = jwt_secret.into(); self }
	pub fn sweep_schedule(&mut self, sweep_schedule: impl Into<Box<str>>) -> &mut Self { self.opts.sweep_schedule = sweep_schedule.into(); self }
	pub fn rate_limits(&mut self, rate_limits: RateLimitConfig) -> &mut Self { self.rate_limits = rate_limits; self }

	/// Assemble the shared application state without starting the server
	pub fn build(self) -> ApiResult<App> {
		if self.opts.jwt_secret.is_empty() {
			return Err(Error::ValidationError("jwt_secret must be configured".into()));
		}
		// fail early on a bad schedule instead of inside the sweeper task
		CronSchedule::parse(&self.opts.sweep_schedule)?;

		let limiter = Arc::new(RateLimitManager::new(self.rate_limits));
		Ok(Arc::new(AppState { security: limiter.clone(), limiter, opts: self.opts }))
	}

	pub async fn run(self) -> ApiResult<()> {
		tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.init();
		info!("NebulaX Security Gateway v{}", VERSION);

		let app = self.build()?;
		let schedule = CronSchedule::parse(&app.opts.sweep_schedule)?;
		spawn_sweeper(app.limiter.clone(), schedule);

		let router = routes::init(app.clone());
		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await?;
		info!("Listening on {} ({:?} mode)", app.opts.listen, app.opts.mode);
		axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;

		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn build_requires_jwt_secret() {
		assert!(AppBuilder::new().build().is_err());
	}

	#[test]
	fn build_rejects_bad_schedule() {
		let mut builder = AppBuilder::new();
		builder.jwt_secret("test-secret").sweep_schedule("nonsense");
		assert!(builder.build().is_err());
	}

	#[test]
	fn build_wires_shared_state() {
		let mut builder = AppBuilder::new();
		builder.jwt_secret("test-secret").mode(ServerMode::Proxy);
		let app = builder.build().expect("valid builder");
		assert_eq!(app.opts.mode, ServerMode::Proxy);
		// the trait object and the manager are the same instance
		assert_eq!(app.security.stats().tracked_windows, 0);
	}
}

// vim: ts=4
