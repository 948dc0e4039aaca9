//! Order Model

use super::user::UserSummary;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Transitions only move forward: `Pending -> Completed` via a successful
/// handoff verification, `Pending -> Canceled` via buyer cancellation or
/// expiry. `Completed` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Canceled,
}

impl OrderStatus {
    /// Whether no further transition is permitted out of this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }

    /// Whether the state machine permits moving to `next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Completed)
                | (OrderStatus::Pending, OrderStatus::Canceled)
        )
    }
}

/// One (item, quantity, price-at-purchase) tuple within an order
///
/// Immutable once the order is created; `name` and `price` are captured at
/// order time so the record survives later listing edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Item reference (String ID)
    pub item: String,
    pub name: String,
    /// Unit price captured at order-creation time
    pub price: Decimal,
    pub quantity: u32,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<String>,
    /// Globally-unique order reference, never reused
    pub transaction_id: String,
    /// Buyer reference (String ID)
    pub buyer: String,
    /// Seller reference (String ID, single seller per order)
    pub seller: String,
    pub lines: Vec<LineItem>,
    /// Total amount: sum of price * quantity over lines
    pub amount: Decimal,
    /// Argon2 hash of the current handoff code (plaintext is never stored)
    pub handoff_hash: String,
    /// Bumped on every code regeneration; guards verify/regenerate races
    pub handoff_version: u32,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order projection returned by the API
///
/// Buyer/seller are resolved to display summaries and the handoff hash is
/// not exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: String,
    pub transaction_id: String,
    pub buyer: UserSummary,
    pub seller: UserSummary,
    pub lines: Vec<LineItem>,
    pub amount: Decimal,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderView {
    pub fn from_order(order: &Order, buyer: UserSummary, seller: UserSummary) -> Self {
        Self {
            id: order.id.clone().unwrap_or_default(),
            transaction_id: order.transaction_id.clone(),
            buyer,
            seller,
            lines: order.lines.clone(),
            amount: order.amount,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Role selector for order listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderRole {
    Buyer,
    Seller,
}

/// One requested line of a new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub item_id: String,
    pub quantity: u32,
}

/// Create order payload (explicit lines)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub lines: Vec<OrderLineInput>,
}

/// Returned once at order creation
///
/// `handoff_code` is the only plaintext exposure of the one-time code; it
/// cannot be re-derived afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub transaction_id: String,
    pub handoff_code: String,
    pub amount: Decimal,
}

/// Verify handoff payload (seller presents the buyer's code)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyHandoff {
    pub code: String,
}

/// Result of a successful handoff verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffResult {
    pub order_id: String,
    pub status: OrderStatus,
}

/// Returned once at code regeneration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegeneratedCode {
    pub handoff_code: String,
}
