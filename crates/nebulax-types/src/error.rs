//! Error types shared across the NebulaX gateway.

use axum::{http::StatusCode, response::IntoResponse, Json};

pub type ApiResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	Unauthorized,
	ValidationError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "Resource not found"),
			Error::PermissionDenied => write!(f, "Permission denied"),
			Error::Unauthorized => write!(f, "Authentication required"),
			Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
			Error::Internal(msg) => write!(f, "Internal error: {}", msg),
			Error::Io(err) => write!(f, "IO error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl Error {
	fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "E-NOT-FOUND",
			Error::PermissionDenied => "E-PERMISSION-DENIED",
			Error::Unauthorized => "E-UNAUTHORIZED",
			Error::ValidationError(_) => "E-VALIDATION",
			Error::Internal(_) | Error::Io(_) => "E-INTERNAL",
		}
	}

	fn status(&self) -> StatusCode {
		match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::Unauthorized => StatusCode::UNAUTHORIZED,
			Error::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Error::Internal(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let status = self.status();
		// Internal details stay in the logs, not in the response body
		let message = match &self {
			Error::Internal(_) | Error::Io(_) => {
				tracing::error!("Internal error: {}", self);
				"Internal server error".to_string()
			}
			other => other.to_string(),
		};
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": message
			}
		});
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_codes_are_stable() {
		assert_eq!(Error::NotFound.code(), "E-NOT-FOUND");
		assert_eq!(Error::Unauthorized.code(), "E-UNAUTHORIZED");
		assert_eq!(Error::ValidationError("x".into()).code(), "E-VALIDATION");
	}

	#[test]
	fn internal_errors_collapse_to_500() {
		let err = Error::Internal("db gone".into());
		assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
		let io: Error = std::io::Error::other("boom").into();
		assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}

// vim: ts=4
