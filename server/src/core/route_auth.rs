//! Route Authentication
//!
//! HS256 bearer tokens plus the middleware gating protected and admin
//! route groups. Validated claims are inserted into request extensions as
//! an [`AuthCtx`] so downstream layers and extractors can see the caller.

pub const TOKEN_EXPIRE: u64 = 8; /* hours */

use axum::{
	body::Body,
	extract::State,
	http::Request,
	middleware::Next,
	response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::time;

use crate::prelude::*;
use nebulax_core::extract::AuthCtx;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuthToken<S> {
	pub sub: S,
	pub exp: u64,
	pub r: Option<S>,
}

pub fn generate_access_token(
	user_id: &str,
	roles: Option<&str>,
	secret: &[u8],
) -> ApiResult<Box<str>> {
	let expire = time::SystemTime::now()
		.duration_since(time::UNIX_EPOCH)
		.map_err(|_| Error::PermissionDenied)?
		.as_secs() + 3600 * TOKEN_EXPIRE;

	let token = jsonwebtoken::encode(
		&jsonwebtoken::Header::new(Algorithm::HS256),
		&AuthToken::<&str> { sub: user_id, exp: expire, r: roles },
		&jsonwebtoken::EncodingKey::from_secret(secret),
	)
	.map_err(|_| Error::PermissionDenied)?
	.into();

	Ok(token)
}

fn validate_token(token: &str, secret: &[u8]) -> ApiResult<AuthCtx> {
	let decoding_key = DecodingKey::from_secret(secret);

	let token_data =
		decode::<AuthToken<Box<str>>>(token, &decoding_key, &Validation::new(Algorithm::HS256))
			.map_err(|_| Error::Unauthorized)?;

	let roles = token_data
		.claims
		.r
		.as_deref()
		.unwrap_or("")
		.split(',')
		.filter(|r| !r.is_empty())
		.map(Box::from)
		.collect();

	Ok(AuthCtx { user_id: token_data.claims.sub, roles })
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
	req.headers()
		.get("Authorization")
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
}

pub async fn require_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ApiResult<Response> {
	let token = bearer_token(&req).ok_or(Error::Unauthorized)?;
	let ctx = validate_token(token, app.opts.jwt_secret.as_bytes())?;

	req.extensions_mut().insert(ctx);

	Ok(next.run(req).await)
}

pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> Response {
	if let Some(token) = bearer_token(&req) {
		if let Ok(ctx) = validate_token(token, app.opts.jwt_secret.as_bytes()) {
			req.extensions_mut().insert(ctx);
		}
	}

	next.run(req).await
}

/// Must run inside `require_auth`, which provides the AuthCtx extension
pub async fn require_admin(req: Request<Body>, next: Next) -> ApiResult<Response> {
	let is_admin = req.extensions().get::<AuthCtx>().is_some_and(|a| a.has_role("ADMIN"));
	if !is_admin {
		return Err(Error::PermissionDenied);
	}

	Ok(next.run(req).await)
}


// vim: ts=4
