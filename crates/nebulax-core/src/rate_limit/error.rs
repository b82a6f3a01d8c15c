//! Rate Limiting Error Types
//!
//! Denial reasons surfaced by the limiter, all mapped to HTTP 429 with the
//! standard rate limit headers.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::config::EndpointClass;

/// Rate limit denial reasons
#[derive(Debug)]
pub enum RateLimitError {
	/// Fixed-window quota exhausted for an endpoint class
	QuotaExceeded {
		/// Endpoint class whose quota was exhausted
		class: EndpointClass,
		/// Quota for the window
		limit: u32,
		/// Time until requests are accepted again
		retry_after: Duration,
	},
	/// Source IP blocked after repeated violations
	TemporarilyBlocked {
		/// Remaining block duration
		remaining: Duration,
	},
	/// Source IP blocked by an operator
	ManuallyBlocked {
		/// Remaining block duration
		remaining: Duration,
	},
	/// Unknown endpoint class name
	UnknownClass(String),
}

impl std::fmt::Display for RateLimitError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RateLimitError::QuotaExceeded { class, retry_after, .. } => {
				write!(f, "Rate limit exceeded for {} endpoints, retry after {:?}", class, retry_after)
			}
			RateLimitError::TemporarilyBlocked { remaining } => {
				write!(f, "Source blocked for {:?} after repeated violations", remaining)
			}
			RateLimitError::ManuallyBlocked { remaining } => {
				write!(f, "Source blocked by operator for {:?}", remaining)
			}
			RateLimitError::UnknownClass(class) => {
				write!(f, "Unknown endpoint class: {}", class)
			}
		}
	}
}

impl std::error::Error for RateLimitError {}

fn limited_response(code: &str, message: &str, retry_secs: u64, limit: Option<u32>) -> Response {
	let body = serde_json::json!({
		"error": {
			"code": code,
			"message": message,
			"details": {
				"retryAfter": retry_secs
			}
		}
	});

	let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

	// Standard rate limit headers
	if let Ok(val) = retry_secs.to_string().parse() {
		response.headers_mut().insert("Retry-After", val);
	}
	if let Some(limit) = limit {
		if let Ok(val) = limit.to_string().parse() {
			response.headers_mut().insert("X-RateLimit-Limit", val);
		}
		if let Ok(val) = "0".parse() {
			response.headers_mut().insert("X-RateLimit-Remaining", val);
		}
		if let Ok(val) = retry_secs.to_string().parse() {
			response.headers_mut().insert("X-RateLimit-Reset", val);
		}
	}

	response
}

impl IntoResponse for RateLimitError {
	fn into_response(self) -> Response {
		match self {
			RateLimitError::QuotaExceeded { limit, retry_after, .. } => limited_response(
				"E-RATE-LIMITED",
				"Too many requests. Please slow down.",
				retry_after.as_secs(),
				Some(limit),
			),
			RateLimitError::TemporarilyBlocked { remaining } => limited_response(
				"E-IP-BLOCKED",
				"Access temporarily blocked due to repeated violations.",
				remaining.as_secs(),
				None,
			),
			RateLimitError::ManuallyBlocked { remaining } => limited_response(
				"E-IP-BLOCKED-MANUAL",
				"Access blocked by an operator.",
				remaining.as_secs(),
				None,
			),
			RateLimitError::UnknownClass(_) => {
				let body = serde_json::json!({
					"error": {
						"code": "E-INTERNAL",
						"message": "Internal rate limit error"
					}
				});
				(StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
			}
		}
	}
}


// vim: ts=4
