pub use crate::core::app::App;
pub use nebulax_types::error::{ApiResult, Error};
pub use nebulax_types::types::{ApiResponse, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
