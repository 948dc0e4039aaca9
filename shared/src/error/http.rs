//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::InvalidHandoffCode
            | Self::MultipleSellersInCart
            | Self::SelfPurchase
            | Self::EmptyOrder
            | Self::ItemInvalidPrice => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied | Self::NotOrderSeller | Self::NotOrderBuyer => {
                StatusCode::FORBIDDEN
            }

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::CartEntryNotFound
            | Self::ItemNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderNotPending
            | Self::OrderAlreadyCompleted
            | Self::OrderAlreadyCanceled
            | Self::DuplicateTransactionId
            | Self::InsufficientStock => StatusCode::CONFLICT,

            // 503 Service Unavailable
            Self::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::StorageFull
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
