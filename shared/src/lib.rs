//! Shared types for the Hermit marketplace
//!
//! Common types used across crates: domain models, the unified
//! error-code system, and id/time utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
