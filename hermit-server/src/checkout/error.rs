//! Checkout engine errors and their mapping to API error codes

use super::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Insufficient stock for {item}: requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: u32,
        available: u32,
    },

    #[error("Order has no lines")]
    EmptyOrder,

    #[error("Invalid quantity for item {0}")]
    InvalidQuantity(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Cannot purchase own listing: {0}")]
    SelfPurchase(String),

    #[error("Cart lines span multiple sellers: {first} and {second}")]
    MultipleSellers { first: String, second: String },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Caller is not the seller of order {0}")]
    NotOrderSeller(String),

    #[error("Caller is not the buyer of order {0}")]
    NotOrderBuyer(String),

    #[error("Caller is not a party to order {0}")]
    NotOrderParty(String),

    #[error("Order {order} is not pending (status: {status:?})")]
    OrderNotPending { order: String, status: OrderStatus },

    #[error("Handoff code rejected")]
    InvalidHandoffCode,

    #[error("Transaction id already exists: {0}")]
    DuplicateTransactionId(String),

    #[error("Cart entry not found for item {0}")]
    CartEntryNotFound(String),

    #[error("Hashing failure: {0}")]
    Hashing(String),
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// 将存储错误分类为错误码（客户端负责本地化）
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    if matches!(e, StorageError::Serialization(_)) {
        return ErrorCode::InternalError;
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    ErrorCode::DatabaseError
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = %code, "Storage error occurred");
                AppError::with_message(code, e.to_string())
            }
            CheckoutError::ItemNotFound(id) => {
                AppError::with_message(ErrorCode::ItemNotFound, format!("Item {} not found", id))
                    .with_detail("item_id", id)
            }
            CheckoutError::InsufficientStock {
                item,
                requested,
                available,
            } => AppError::with_message(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: requested {}, available {}",
                    item, requested, available
                ),
            )
            .with_detail("item", item)
            .with_detail("requested", requested)
            .with_detail("available", available),
            CheckoutError::EmptyOrder => AppError::new(ErrorCode::EmptyOrder),
            CheckoutError::InvalidQuantity(item) => AppError::with_message(
                ErrorCode::ValidationFailed,
                format!("Quantity must be positive for item {}", item),
            ),
            CheckoutError::InvalidPrice(msg) => {
                AppError::with_message(ErrorCode::ItemInvalidPrice, msg)
            }
            CheckoutError::SelfPurchase(item) => {
                AppError::new(ErrorCode::SelfPurchase).with_detail("item_id", item)
            }
            CheckoutError::MultipleSellers { first, second } => {
                AppError::new(ErrorCode::MultipleSellersInCart)
                    .with_detail("sellers", vec![first, second])
            }
            CheckoutError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
                    .with_detail("order_id", id)
            }
            CheckoutError::NotOrderSeller(id) => {
                AppError::new(ErrorCode::NotOrderSeller).with_detail("order_id", id)
            }
            CheckoutError::NotOrderBuyer(id) => {
                AppError::new(ErrorCode::NotOrderBuyer).with_detail("order_id", id)
            }
            CheckoutError::NotOrderParty(id) => {
                AppError::new(ErrorCode::PermissionDenied).with_detail("order_id", id)
            }
            CheckoutError::OrderNotPending { order, status } => {
                let code = match status {
                    OrderStatus::Completed => ErrorCode::OrderAlreadyCompleted,
                    OrderStatus::Canceled => ErrorCode::OrderAlreadyCanceled,
                    OrderStatus::Pending => ErrorCode::OrderNotPending,
                };
                AppError::new(code).with_detail("order_id", order)
            }
            CheckoutError::InvalidHandoffCode => AppError::new(ErrorCode::InvalidHandoffCode),
            CheckoutError::DuplicateTransactionId(id) => {
                AppError::new(ErrorCode::DuplicateTransactionId).with_detail("transaction_id", id)
            }
            CheckoutError::CartEntryNotFound(item) => {
                AppError::new(ErrorCode::CartEntryNotFound).with_detail("item_id", item)
            }
            CheckoutError::Hashing(msg) => {
                tracing::error!(error = %msg, "Handoff code hashing failed");
                AppError::internal(msg)
            }
        }
    }
}
