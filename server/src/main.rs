use std::env;
use std::process::ExitCode;

use serde::Deserialize;

use nebulax::{AppBuilder, ServerMode};
use nebulax_core::rate_limit::RateLimitConfig;

/// Optional YAML config, path taken from NEBULAX_CONFIG
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ServerConfig {
	listen: Option<String>,
	mode: Option<ServerMode>,
	jwt_secret: Option<String>,
	sweep_schedule: Option<String>,
	rate_limits: Option<RateLimitConfig>,
}

fn load_config() -> Result<ServerConfig, String> {
	let Some(path) = env::var_os("NEBULAX_CONFIG") else {
		return Ok(ServerConfig::default());
	};
	let raw = std::fs::read_to_string(&path)
		.map_err(|err| format!("cannot read {}: {}", path.to_string_lossy(), err))?;
	serde_yaml::from_str(&raw)
		.map_err(|err| format!("invalid config {}: {}", path.to_string_lossy(), err))
}

#[tokio::main]
async fn main() -> ExitCode {
	let config = match load_config() {
		Ok(config) => config,
		Err(err) => {
			eprintln!("{}", err);
			return ExitCode::FAILURE;
		}
	};

	let jwt_secret = config.jwt_secret.or_else(|| env::var("NEBULAX_JWT_SECRET").ok());
	let Some(jwt_secret) = jwt_secret else {
		eprintln!("NEBULAX_JWT_SECRET (or jwtSecret in the config file) is required");
		return ExitCode::FAILURE;
	};

	let mut builder = AppBuilder::new();
	builder.jwt_secret(jwt_secret);
	if let Some(listen) = config.listen {
		builder.listen(listen);
	}
	if let Some(mode) = config.mode {
		builder.mode(mode);
	}
	if let Some(schedule) = config.sweep_schedule {
		builder.sweep_schedule(schedule);
	}
	if let Some(rate_limits) = config.rate_limits {
		builder.rate_limits(rate_limits);
	}

	if let Err(err) = builder.run().await {
		eprintln!("Fatal: {}", err);
		return ExitCode::FAILURE;
	}
	ExitCode::SUCCESS
}

// vim: ts=4
