//! Utilities: logging bootstrap, validation helpers, unified error re-exports

pub mod logger;
pub mod validation;

// Re-export unified error types from shared for handler convenience
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
