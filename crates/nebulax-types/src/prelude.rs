pub use crate::error::{ApiResult, Error};
pub use crate::types::{ApiResponse, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
