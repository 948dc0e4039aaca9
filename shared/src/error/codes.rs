//! Unified error codes for the Hermit marketplace
//!
//! This module defines all error codes used across the server and clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Order errors
//! - 4xxx: Cart errors
//! - 5xxx: Item errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 6,
    /// Value out of range
    ValueOutOfRange = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Caller is not the order's seller
    NotOrderSeller = 2002,
    /// Caller is not the order's buyer
    NotOrderBuyer = 2003,

    // ==================== 3xxx: Order ====================
    /// Order not found
    OrderNotFound = 3001,
    /// Order is not in the pending state
    OrderNotPending = 3002,
    /// Order has already been completed
    OrderAlreadyCompleted = 3003,
    /// Order has already been canceled
    OrderAlreadyCanceled = 3004,
    /// Handoff code does not match
    InvalidHandoffCode = 3005,
    /// Generated transaction id collided with an existing order
    DuplicateTransactionId = 3006,
    /// Cart lines span more than one seller
    MultipleSellersInCart = 3007,
    /// Buyer attempted to purchase their own listing
    SelfPurchase = 3008,
    /// Order has no lines
    EmptyOrder = 3009,

    // ==================== 4xxx: Cart ====================
    /// Cart entry not found
    CartEntryNotFound = 4001,

    // ==================== 5xxx: Item ====================
    /// Item not found
    ItemNotFound = 5001,
    /// Requested quantity exceeds available stock
    InsufficientStock = 5002,
    /// Item has an invalid price
    ItemInvalidPrice = 5003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Storage full (disk space insufficient)
    StorageFull = 9003,
    /// Storage corrupted (data file damaged)
    StorageCorrupted = 9004,
    /// System busy, please retry later
    SystemBusy = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code represents success
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::NotOrderSeller => "Caller is not the seller of this order",
            ErrorCode::NotOrderBuyer => "Caller is not the buyer of this order",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderNotPending => "Order is not pending",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderAlreadyCanceled => "Order has already been canceled",
            ErrorCode::InvalidHandoffCode => "Invalid handoff code",
            ErrorCode::DuplicateTransactionId => "Transaction id already exists",
            ErrorCode::MultipleSellersInCart => "Cart contains items from multiple sellers",
            ErrorCode::SelfPurchase => "Cannot purchase your own listing",
            ErrorCode::EmptyOrder => "Order contains no items",

            // Cart
            ErrorCode::CartEntryNotFound => "Cart entry not found",

            // Item
            ErrorCode::ItemNotFound => "Item not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ItemInvalidPrice => "Item has an invalid price",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::StorageFull => "Storage full (disk space insufficient)",
            ErrorCode::StorageCorrupted => "Storage corrupted (data file damaged)",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::RequiredField),
            7 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::NotOrderSeller),
            2003 => Ok(ErrorCode::NotOrderBuyer),

            // Order
            3001 => Ok(ErrorCode::OrderNotFound),
            3002 => Ok(ErrorCode::OrderNotPending),
            3003 => Ok(ErrorCode::OrderAlreadyCompleted),
            3004 => Ok(ErrorCode::OrderAlreadyCanceled),
            3005 => Ok(ErrorCode::InvalidHandoffCode),
            3006 => Ok(ErrorCode::DuplicateTransactionId),
            3007 => Ok(ErrorCode::MultipleSellersInCart),
            3008 => Ok(ErrorCode::SelfPurchase),
            3009 => Ok(ErrorCode::EmptyOrder),

            // Cart
            4001 => Ok(ErrorCode::CartEntryNotFound),

            // Item
            5001 => Ok(ErrorCode::ItemNotFound),
            5002 => Ok(ErrorCode::InsufficientStock),
            5003 => Ok(ErrorCode::ItemInvalidPrice),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::StorageFull),
            9004 => Ok(ErrorCode::StorageCorrupted),
            9005 => Ok(ErrorCode::SystemBusy),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 3001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 5002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_roundtrip_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::TokenExpired,
            ErrorCode::NotOrderSeller,
            ErrorCode::InvalidHandoffCode,
            ErrorCode::CartEntryNotFound,
            ErrorCode::ItemNotFound,
            ErrorCode::SystemBusy,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(777), Err(InvalidErrorCode(777)));
    }

    #[test]
    fn test_serialize_as_u16() {
        let json = serde_json::to_string(&ErrorCode::InvalidHandoffCode).unwrap();
        assert_eq!(json, "3005");

        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::InsufficientStock);
    }
}
