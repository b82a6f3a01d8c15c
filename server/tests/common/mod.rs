//! Shared helpers for integration tests: app construction, request
//! building with a fake peer address, and response body collection.

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use std::net::{IpAddr, SocketAddr};

use nebulax::core::route_auth::generate_access_token;
use nebulax::{App, AppBuilder};
use nebulax_core::rate_limit::RateLimitConfig;

pub const JWT_SECRET: &str = "integration-test-secret";

pub fn test_app() -> (App, Router) {
	test_app_with_limits(RateLimitConfig::default())
}

pub fn test_app_with_limits(rate_limits: RateLimitConfig) -> (App, Router) {
	let mut builder = AppBuilder::new();
	builder.jwt_secret(JWT_SECRET).rate_limits(rate_limits);
	let app = builder.build().expect("app builds");
	let router = nebulax::routes::init(app.clone());
	(app, router)
}

pub fn admin_token() -> String {
	generate_access_token("u-9000", Some("ADMIN"), JWT_SECRET.as_bytes())
		.expect("token")
		.to_string()
}

pub fn trader_token(user_id: &str) -> String {
	generate_access_token(user_id, Some("TRADER"), JWT_SECRET.as_bytes())
		.expect("token")
		.to_string()
}

pub struct RequestBuilder {
	method: &'static str,
	uri: String,
	peer: IpAddr,
	token: Option<String>,
	body: Option<serde_json::Value>,
}

pub fn req(method: &'static str, uri: &str, peer: IpAddr) -> RequestBuilder {
	RequestBuilder { method, uri: uri.to_string(), peer, token: None, body: None }
}

impl RequestBuilder {
	pub fn token(mut self, token: &str) -> Self {
		self.token = Some(token.to_string());
		self
	}

	pub fn json(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);
		self
	}

	pub fn build(self) -> Request<Body> {
		let mut builder = Request::builder().method(self.method).uri(self.uri);
		if let Some(token) = &self.token {
			builder = builder.header("Authorization", format!("Bearer {}", token));
		}
		let body = match &self.body {
			Some(json) => {
				builder = builder.header("Content-Type", "application/json");
				Body::from(json.to_string())
			}
			None => Body::empty(),
		};
		let mut request = builder.body(body).expect("valid request");
		request.extensions_mut().insert(ConnectInfo(SocketAddr::new(self.peer, 55011)));
		request
	}
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
	use tower::ServiceExt;
	router.clone().oneshot(request).await.expect("infallible")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
	let bytes = response.into_body().collect().await.expect("body").to_bytes();
	serde_json::from_slice(&bytes).expect("json body")
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
	response.headers().get(name).and_then(|v| v.to_str().ok())
}

// vim: ts=4
