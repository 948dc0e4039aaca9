//! Inventory ledger
//!
//! The single source of truth for per-item stock. Stock only moves through
//! [`InventoryLedger::reserve`] and [`InventoryLedger::release`]; the check
//! and the decrement always happen inside one write transaction, so no
//! caller can act on a stale stock value between the two.

use super::error::{CheckoutError, CheckoutResult};
use super::storage::{CheckoutStorage, StorageError};
use redb::WriteTransaction;
use shared::models::Item;
use shared::util::now_millis;

#[derive(Clone, Debug)]
pub struct InventoryLedger {
    storage: CheckoutStorage,
}

impl InventoryLedger {
    pub fn new(storage: CheckoutStorage) -> Self {
        Self { storage }
    }

    /// Atomically check-and-decrement stock within a caller-owned transaction
    ///
    /// Returns the item as it stands after the decrement. Fails with
    /// `InsufficientStock` when `quantity` exceeds the current stock, leaving
    /// the item untouched.
    pub fn reserve_txn(
        &self,
        txn: &WriteTransaction,
        item_id: &str,
        quantity: u32,
    ) -> CheckoutResult<Item> {
        let mut item = self
            .storage
            .get_item_txn(txn, item_id)?
            .ok_or_else(|| CheckoutError::ItemNotFound(item_id.to_string()))?;

        if quantity > item.stock {
            return Err(CheckoutError::InsufficientStock {
                item: item.name,
                requested: quantity,
                available: item.stock,
            });
        }

        item.stock -= quantity;
        item.updated_at = now_millis();
        self.storage.put_item_txn(txn, &item)?;
        Ok(item)
    }

    /// Return previously reserved stock within a caller-owned transaction
    ///
    /// Used for cancellation restitution.
    pub fn release_txn(
        &self,
        txn: &WriteTransaction,
        item_id: &str,
        quantity: u32,
    ) -> CheckoutResult<Item> {
        let mut item = self
            .storage
            .get_item_txn(txn, item_id)?
            .ok_or_else(|| CheckoutError::ItemNotFound(item_id.to_string()))?;

        item.stock = item.stock.saturating_add(quantity);
        item.updated_at = now_millis();
        self.storage.put_item_txn(txn, &item)?;
        Ok(item)
    }

    /// Reserve stock in its own transaction
    pub fn reserve(&self, item_id: &str, quantity: u32) -> CheckoutResult<Item> {
        let txn = self.storage.begin_write()?;
        let item = self.reserve_txn(&txn, item_id, quantity)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::debug!(item_id, quantity, stock = item.stock, "Stock reserved");
        Ok(item)
    }

    /// Release stock in its own transaction
    pub fn release(&self, item_id: &str, quantity: u32) -> CheckoutResult<Item> {
        let txn = self.storage.begin_write()?;
        let item = self.release_txn(&txn, item_id, quantity)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::debug!(item_id, quantity, stock = item.stock, "Stock released");
        Ok(item)
    }
}
