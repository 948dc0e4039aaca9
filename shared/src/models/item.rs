//! Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Marketplace listing entity
///
/// `stock` is the authoritative unit count and is mutated only through the
/// inventory ledger; all other fields belong to the listing seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<String>,
    /// Owning seller reference (String ID)
    pub seller: String,
    pub name: String,
    pub description: String,
    /// Free-form category label
    pub category: String,
    /// Unit price (non-negative)
    pub price: Decimal,
    /// Units available for reservation
    pub stock: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create listing payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub stock: u32,
}
