//! End-to-end tests for the rate limit middleware: quota headers, the 429
//! contract, per-IP and per-user keying, and block enforcement.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr};

use common::*;
use nebulax_core::rate_limit::{ClassLimit, RateLimitConfig};

fn peer(last: u8) -> IpAddr {
	IpAddr::V4(Ipv4Addr::new(203, 0, 113, last))
}

#[tokio::test]
async fn accepted_response_carries_quota_headers() {
	let (_app, router) = test_app();

	let response = send(&router, req("GET", "/api/market/tickers", peer(1)).build()).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(header(&response, "X-RateLimit-Limit"), Some("300"));
	assert_eq!(header(&response, "X-RateLimit-Remaining"), Some("299"));
	assert!(header(&response, "X-RateLimit-Reset").is_some());
}

#[tokio::test]
async fn sixth_login_attempt_is_limited() {
	let (_app, router) = test_app();
	let login = json!({ "email": "trader@nebulax.io", "password": "margin-call-7" });

	for _ in 0..5 {
		let response =
			send(&router, req("POST", "/api/auth/login", peer(2)).json(login.clone()).build())
				.await;
		assert_eq!(response.status(), StatusCode::OK);
	}

	let response =
		send(&router, req("POST", "/api/auth/login", peer(2)).json(login).build()).await;
	assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
	assert_eq!(header(&response, "Retry-After"), Some("1800"));
	assert_eq!(header(&response, "X-RateLimit-Limit"), Some("5"));
	assert_eq!(header(&response, "X-RateLimit-Remaining"), Some("0"));

	let body = body_json(response).await;
	assert_eq!(body["error"]["code"], "E-RATE-LIMITED");
	assert_eq!(body["error"]["details"]["retryAfter"], 1800);
}

#[tokio::test]
async fn limits_are_keyed_per_ip() {
	let (_app, router) = test_app();
	let login = json!({ "email": "trader@nebulax.io", "password": "margin-call-7" });

	for _ in 0..5 {
		send(&router, req("POST", "/api/auth/login", peer(3)).json(login.clone()).build()).await;
	}
	let limited =
		send(&router, req("POST", "/api/auth/login", peer(3)).json(login.clone()).build()).await;
	assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

	// a different source is unaffected
	let fresh = send(&router, req("POST", "/api/auth/login", peer(4)).json(login).build()).await;
	assert_eq!(fresh.status(), StatusCode::OK);
}

#[tokio::test]
async fn trading_requires_a_token() {
	let (_app, router) = test_app();
	let order = json!({ "pair": "BTC-USDT", "side": "buy", "orderType": "market", "quantity": 1.0 });

	let response =
		send(&router, req("POST", "/api/trading/order", peer(5)).json(order).build()).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_traffic_is_keyed_per_user() {
	let limits =
		RateLimitConfig { trading: ClassLimit::new(2, 60), ..RateLimitConfig::default() };
	let (_app, router) = test_app_with_limits(limits);

	let order = json!({ "pair": "BTC-USDT", "side": "buy", "orderType": "market", "quantity": 1.0 });
	let alice = trader_token("u-2001");
	let bob = trader_token("u-2002");

	for _ in 0..2 {
		let response = send(
			&router,
			req("POST", "/api/trading/order", peer(6)).token(&alice).json(order.clone()).build(),
		)
		.await;
		assert_eq!(response.status(), StatusCode::ACCEPTED);
	}
	let limited = send(
		&router,
		req("POST", "/api/trading/order", peer(6)).token(&alice).json(order.clone()).build(),
	)
	.await;
	assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

	// same IP, different user: separate window
	let response = send(
		&router,
		req("POST", "/api/trading/order", peer(6)).token(&bob).json(order).build(),
	)
	.await;
	assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn withdrawal_quota_is_independent_of_trading() {
	let limits =
		RateLimitConfig { trading: ClassLimit::new(1, 60), ..RateLimitConfig::default() };
	let (_app, router) = test_app_with_limits(limits);

	let token = trader_token("u-2003");
	let order = json!({ "pair": "BTC-USDT", "side": "sell", "orderType": "market", "quantity": 0.5 });
	let withdrawal = json!({ "asset": "BTC", "amount": 0.1, "address": "bc1q-test-address" });

	let first = send(
		&router,
		req("POST", "/api/trading/order", peer(7)).token(&token).json(order.clone()).build(),
	)
	.await;
	assert_eq!(first.status(), StatusCode::ACCEPTED);
	let limited = send(
		&router,
		req("POST", "/api/trading/order", peer(7)).token(&token).json(order).build(),
	)
	.await;
	assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

	let response = send(
		&router,
		req("POST", "/api/trading/withdrawal", peer(7)).token(&token).json(withdrawal).build(),
	)
	.await;
	assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn blocked_ip_is_denied_on_every_class() {
	let (app, router) = test_app();

	// escalate through repeated violations
	for _ in 0..5 {
		app.limiter.penalize(peer(8));
	}

	let market = send(&router, req("GET", "/api/market/tickers", peer(8)).build()).await;
	assert_eq!(market.status(), StatusCode::TOO_MANY_REQUESTS);
	let body = body_json(market).await;
	assert_eq!(body["error"]["code"], "E-IP-BLOCKED");

	let login = json!({ "email": "trader@nebulax.io", "password": "margin-call-7" });
	let auth = send(&router, req("POST", "/api/auth/login", peer(8)).json(login).build()).await;
	assert_eq!(auth.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn failed_login_is_rejected_and_penalized() {
	let (app, router) = test_app();
	let login = json!({ "email": "trader@nebulax.io", "password": "wrong" });

	let response = send(&router, req("POST", "/api/auth/login", peer(9)).json(login).build()).await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);

	let status = app.security.status(peer(9));
	assert_eq!(status.violations, 1);
}

#[tokio::test]
async fn healthz_is_unclassified() {
	let (_app, router) = test_app();

	let response = send(&router, req("GET", "/healthz", peer(10)).build()).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert!(header(&response, "X-RateLimit-Limit").is_none());
	let body = body_json(response).await;
	assert_eq!(body["status"], "ok");
}

// vim: ts=4
