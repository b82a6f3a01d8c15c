//! Route Table
//!
//! Groups routes by endpoint class and wraps each group in its rate limit
//! layer. Auth middleware sits outside the limiter so authenticated
//! traffic is keyed per user before the quota check runs.

use axum::{middleware, routing::{delete, get, post}, Json, Router};

use crate::core::app::{App, VERSION};
use crate::core::route_auth::{optional_auth, require_admin, require_auth};
use crate::{auth, market, security, trading};
use nebulax_core::rate_limit::{EndpointClass, RateLimitLayer};

pub fn init(app: App) -> Router {
	let mode = app.opts.mode;
	let limiter = app.limiter.clone();

	let auth_router = Router::new()
		.route("/api/auth/login", post(auth::handler::post_login))
		.layer(RateLimitLayer::new(limiter.clone(), EndpointClass::Auth, mode));

	let market_router = Router::new()
		.route("/api/market/tickers", get(market::handler::get_tickers))
		.route("/api/market/volatility", get(market::handler::get_volatility))
		.layer(RateLimitLayer::new(limiter.clone(), EndpointClass::Market, mode))
		.layer(middleware::from_fn_with_state(app.clone(), optional_auth));

	let trading_router = Router::new()
		.route("/api/trading/order", post(trading::handler::post_order))
		.layer(RateLimitLayer::new(limiter.clone(), EndpointClass::Trading, mode))
		.layer(middleware::from_fn_with_state(app.clone(), require_auth));

	let withdrawal_router = Router::new()
		.route("/api/trading/withdrawal", post(trading::handler::post_withdrawal))
		.layer(RateLimitLayer::new(limiter.clone(), EndpointClass::Withdrawal, mode))
		.layer(middleware::from_fn_with_state(app.clone(), require_auth));

	let security_router = Router::new()
		.route("/api/security/events", get(security::handler::get_events))
		.route(
			"/api/security/blocks",
			get(security::handler::get_blocks).post(security::handler::post_block),
		)
		.route("/api/security/blocks/{ip}", delete(security::handler::delete_block))
		.route("/api/security/stats", get(security::handler::get_stats))
		.route("/api/security/status/{ip}", get(security::handler::get_status))
		.layer(RateLimitLayer::new(limiter, EndpointClass::Admin, mode))
		.layer(middleware::from_fn(require_admin))
		.layer(middleware::from_fn_with_state(app.clone(), require_auth));

	Router::new()
		.route("/healthz", get(healthz))
		.merge(auth_router)
		.merge(market_router)
		.merge(trading_router)
		.merge(withdrawal_router)
		.merge(security_router)
		.layer(tower_http::trace::TraceLayer::new_for_http())
		.layer(tower_http::cors::CorsLayer::permissive())
		.with_state(app)
}

async fn healthz() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}

// vim: ts=4
