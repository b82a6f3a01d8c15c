//! Custom extractors for NebulaX-specific request data

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::prelude::*;

/// Authenticated caller context, inserted as a request extension by the
/// server's auth middleware after token validation.
#[derive(Debug, Clone)]
pub struct AuthCtx {
	pub user_id: Box<str>,
	pub roles: Box<[Box<str>]>,
}

impl AuthCtx {
	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r.as_ref() == role)
	}
}

// Auth //
//******//
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(ctx) = parts.extensions.get::<AuthCtx>().cloned() {
			Ok(Auth(ctx))
		} else {
			Err(Error::PermissionDenied)
		}
	}
}

// OptionalAuth //
//***************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthCtx>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(OptionalAuth(parts.extensions.get::<AuthCtx>().cloned()))
	}
}


// vim: ts=4
