//! Simulated market data endpoints. Prices drift randomly around fixed
//! reference levels; there is no live feed behind them.

use axum::Json;
use rand::RngExt;
use serde::Serialize;

use crate::prelude::*;
use nebulax_core::extract::OptionalAuth;
use nebulax_types::types;

const PAIRS: &[(&str, f64)] = &[
	("BTC-USDT", 67_000.0),
	("ETH-USDT", 3_500.0),
	("SOL-USDT", 140.0),
	("XRP-USDT", 0.52),
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
	pub pair: String,
	pub last_price: f64,
	pub change_24h: f64,
	pub volume_24h: f64,
	pub at: Timestamp,
}

/// # GET /api/market/tickers
pub async fn get_tickers(
	OptionalAuth(auth): OptionalAuth,
) -> ApiResult<Json<ApiResponse<Vec<Ticker>>>> {
	if let Some(auth) = &auth {
		debug!(user_id = %auth.user_id, "Authenticated ticker poll");
	}
	let mut rng = rand::rng();
	let at = types::now();

	let tickers = PAIRS
		.iter()
		.map(|&(pair, reference)| {
			let drift = rng.random_range(-0.02..0.02);
			Ticker {
				pair: pair.to_string(),
				last_price: reference * (1.0 + drift),
				change_24h: rng.random_range(-5.0..5.0),
				volume_24h: rng.random_range(1.0e6..5.0e7),
				at,
			}
		})
		.collect();

	Ok(Json(ApiResponse::new(tickers)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volatility {
	pub pair: String,
	pub volatility_24h: f64,
	pub at: Timestamp,
}

/// # GET /api/market/volatility
pub async fn get_volatility() -> ApiResult<Json<ApiResponse<Vec<Volatility>>>> {
	let mut rng = rand::rng();
	let at = types::now();

	let readings = PAIRS
		.iter()
		.map(|&(pair, _)| Volatility {
			pair: pair.to_string(),
			volatility_24h: rng.random_range(0.5..12.0),
			at,
		})
		.collect();

	Ok(Json(ApiResponse::new(readings)))
}

// vim: ts=4
