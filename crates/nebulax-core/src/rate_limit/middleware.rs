//! Rate Limiting Middleware
//!
//! Tower middleware layer for applying per-class rate limits to Axum
//! routes. Resolves the request identity (authenticated user, source IP,
//! or the shared fallback), asks the manager for a verdict, and stamps
//! quota headers on accepted responses.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures::future::BoxFuture;
use hyper::Request;
use tower::{Layer, Service};

use super::api::QuotaStatus;
use super::config::EndpointClass;
use super::extractors::{extract_client_ip, ClientIp, IdentityKey, ServerMode};
use super::limiter::RateLimitManager;
use crate::extract::AuthCtx;

/// Rate limit middleware layer
#[derive(Clone)]
pub struct RateLimitLayer {
	manager: Arc<RateLimitManager>,
	class: EndpointClass,
	mode: ServerMode,
}

impl RateLimitLayer {
	/// Create a new rate limit layer for one endpoint class
	pub fn new(manager: Arc<RateLimitManager>, class: EndpointClass, mode: ServerMode) -> Self {
		Self { manager, class, mode }
	}
}

impl<S> Layer<S> for RateLimitLayer {
	type Service = RateLimitService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RateLimitService {
			inner,
			manager: self.manager.clone(),
			class: self.class,
			mode: self.mode,
		}
	}
}

/// Rate limit middleware service
#[derive(Clone)]
pub struct RateLimitService<S> {
	inner: S,
	manager: Arc<RateLimitManager>,
	class: EndpointClass,
	mode: ServerMode,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
	S: Service<Request<Body>, Response = axum::response::Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let manager = self.manager.clone();
		let class = self.class;
		let mode = self.mode;
		let mut inner = self.inner.clone();

		Box::pin(async move {
			let mut req = req;
			let client_ip = extract_client_ip(&req, &mode);
			if let Some(ip) = client_ip {
				req.extensions_mut().insert(ClientIp(ip));
			}

			// Authenticated requests are limited per user, anonymous ones
			// per source IP. Traffic with neither shares one bucket.
			let identity = match req.extensions().get::<AuthCtx>() {
				Some(auth) => IdentityKey::User(auth.user_id.clone()),
				None => match client_ip {
					Some(ip) => IdentityKey::Ip(ip),
					None => IdentityKey::Global,
				},
			};

			match manager.check(&identity, client_ip, class) {
				Ok(quota) => {
					let mut response = inner.call(req).await?;
					stamp_quota_headers(response.headers_mut(), &quota);
					Ok(response)
				}
				Err(error) => Ok(error.into_response()),
			}
		})
	}
}

/// Advertise the quota standing on an accepted response
fn stamp_quota_headers(headers: &mut HeaderMap, quota: &QuotaStatus) {
	if let Ok(val) = quota.limit.to_string().parse() {
		headers.insert("X-RateLimit-Limit", val);
	}
	if let Ok(val) = quota.remaining.to_string().parse() {
		headers.insert("X-RateLimit-Remaining", val);
	}
	if let Ok(val) = quota.reset_after.as_secs().to_string().parse() {
		headers.insert("X-RateLimit-Reset", val);
	}
}


// vim: ts=4
