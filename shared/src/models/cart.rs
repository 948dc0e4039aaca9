//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One (item, quantity) entry in a user's cart
///
/// Unique per item within a cart; adding an already-present item merges
/// into the existing entry instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntry {
    /// Item reference (String ID)
    pub item: String,
    pub quantity: u32,
    pub added_at: i64,
}

/// Cart entry with resolved listing details (read model for display)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntryDetail {
    pub item_id: String,
    pub name: String,
    pub price: Decimal,
    /// Current stock of the listing (informational; checked again at checkout)
    pub stock: u32,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartAdd {
    pub item_id: String,
    pub quantity: u32,
}

/// Update-quantity payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartUpdate {
    pub quantity: u32,
}
