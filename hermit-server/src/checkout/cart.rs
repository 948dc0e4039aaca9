//! Cart store
//!
//! Per-user carts, independent of the inventory ledger until checkout.
//! Stock limits are enforced against the live listing on every mutation so
//! a cart can never hold more of an item than the listing currently has,
//! but nothing is reserved until the order is created.

use super::error::{CheckoutError, CheckoutResult};
use super::storage::{CheckoutStorage, StorageError};
use rust_decimal::Decimal;
use shared::models::{CartEntry, CartEntryDetail};
use shared::util::now_millis;

#[derive(Clone, Debug)]
pub struct CartStore {
    storage: CheckoutStorage,
}

impl CartStore {
    pub fn new(storage: CheckoutStorage) -> Self {
        Self { storage }
    }

    /// Add an item to the user's cart, merging with an existing entry
    ///
    /// Rejects the user's own listings and quantities that would exceed the
    /// listing's current stock (counting what the cart already holds).
    pub fn add(&self, user_id: &str, item_id: &str, quantity: u32) -> CheckoutResult<CartEntry> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidQuantity(item_id.to_string()));
        }

        let txn = self.storage.begin_write()?;
        let item = self
            .storage
            .get_item_txn(&txn, item_id)?
            .ok_or_else(|| CheckoutError::ItemNotFound(item_id.to_string()))?;
        if item.seller == user_id {
            return Err(CheckoutError::SelfPurchase(item_id.to_string()));
        }

        let mut entries = self.storage.get_cart_txn(&txn, user_id)?;
        let existing = entries
            .iter()
            .find(|e| e.item == item_id)
            .map(|e| e.quantity)
            .unwrap_or(0);
        let merged = existing
            .checked_add(quantity)
            .ok_or_else(|| CheckoutError::InvalidQuantity(item_id.to_string()))?;
        if merged > item.stock {
            return Err(CheckoutError::InsufficientStock {
                item: item.name,
                requested: merged,
                available: item.stock,
            });
        }

        let entry = match entries.iter_mut().find(|e| e.item == item_id) {
            Some(entry) => {
                entry.quantity = merged;
                entry.clone()
            }
            None => {
                let entry = CartEntry {
                    item: item_id.to_string(),
                    quantity,
                    added_at: now_millis(),
                };
                entries.push(entry.clone());
                entry
            }
        };
        self.storage.put_cart_txn(&txn, user_id, &entries)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(user_id, item_id, quantity = entry.quantity, "Cart entry upserted");
        Ok(entry)
    }

    /// Set the quantity of an existing cart entry
    ///
    /// A quantity of zero is not a valid update; use [`CartStore::remove`].
    pub fn update(&self, user_id: &str, item_id: &str, quantity: u32) -> CheckoutResult<CartEntry> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidQuantity(item_id.to_string()));
        }

        let txn = self.storage.begin_write()?;
        let item = self
            .storage
            .get_item_txn(&txn, item_id)?
            .ok_or_else(|| CheckoutError::ItemNotFound(item_id.to_string()))?;
        if quantity > item.stock {
            return Err(CheckoutError::InsufficientStock {
                item: item.name,
                requested: quantity,
                available: item.stock,
            });
        }

        let mut entries = self.storage.get_cart_txn(&txn, user_id)?;
        let entry = match entries.iter_mut().find(|e| e.item == item_id) {
            Some(entry) => {
                entry.quantity = quantity;
                entry.clone()
            }
            None => return Err(CheckoutError::CartEntryNotFound(item_id.to_string())),
        };
        self.storage.put_cart_txn(&txn, user_id, &entries)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(user_id, item_id, quantity, "Cart entry updated");
        Ok(entry)
    }

    /// Remove an entry from the cart
    ///
    /// Absence is reported as `CartEntryNotFound`.
    pub fn remove(&self, user_id: &str, item_id: &str) -> CheckoutResult<()> {
        let txn = self.storage.begin_write()?;
        let mut entries = self.storage.get_cart_txn(&txn, user_id)?;
        let before = entries.len();
        entries.retain(|e| e.item != item_id);
        if entries.len() == before {
            return Err(CheckoutError::CartEntryNotFound(item_id.to_string()));
        }
        self.storage.put_cart_txn(&txn, user_id, &entries)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(user_id, item_id, "Cart entry removed");
        Ok(())
    }

    /// Raw cart entries in insertion order
    pub fn entries(&self, user_id: &str) -> CheckoutResult<Vec<CartEntry>> {
        Ok(self.storage.get_cart(user_id)?)
    }

    /// Cart entries with resolved listing details, in insertion order
    ///
    /// Entries whose listing has vanished are skipped with a warning rather
    /// than failing the whole read.
    pub fn list(&self, user_id: &str) -> CheckoutResult<Vec<CartEntryDetail>> {
        let entries = self.storage.get_cart(user_id)?;
        let mut details = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(item) = self.storage.get_item(&entry.item)? else {
                tracing::warn!(user_id, item_id = %entry.item, "Cart entry references missing item");
                continue;
            };
            details.push(CartEntryDetail {
                item_id: entry.item,
                name: item.name,
                price: item.price,
                stock: item.stock,
                quantity: entry.quantity,
                line_total: item.price * Decimal::from(entry.quantity),
            });
        }
        Ok(details)
    }
}
