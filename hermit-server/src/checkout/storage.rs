//! redb-based storage layer for the checkout engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `items` | `item_id` | `Item` | Marketplace listings (authoritative stock) |
//! | `orders` | `order_id` | `Order` | Orders with embedded line items |
//! | `carts` | `user_id` | `Vec<CartEntry>` | Per-user carts |
//! | `users` | `user_id` | `User` | Display records (written by external auth) |
//! | `transaction_index` | `transaction_id` | `order_id` | Transaction-id uniqueness |
//! | `pending_orders` | `order_id` | `created_at` | Pending index for expiry sweeps |
//!
//! # Concurrency
//!
//! redb admits a single write transaction at a time with all-or-nothing
//! commit; a stock check and its decrement therefore always land in the same
//! serialization unit, and a multi-line order either commits every
//! reservation or none. Reads are MVCC snapshots and proceed in parallel.
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default: once `commit()`
//! returns the record survives power loss, and the file is always in a
//! consistent state via copy-on-write.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::models::{CartEntry, Item, Order, User};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for listings: key = item_id, value = JSON-serialized Item
const ITEMS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("items");

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for carts: key = user_id, value = JSON-serialized Vec<CartEntry>
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Table for user display records: key = user_id, value = JSON-serialized User
const USERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Table enforcing transaction-id uniqueness: key = transaction_id, value = order_id
const TRANSACTION_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("transaction_index");

/// Table indexing pending orders for expiry sweeps: key = order_id, value = created_at millis
const PENDING_ORDERS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("pending_orders");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Checkout storage backed by redb
#[derive(Clone)]
pub struct CheckoutStorage {
    db: Arc<Database>,
}

impl CheckoutStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Create all tables up front so later read transactions never race
    /// table creation
    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ITEMS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(CARTS_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(TRANSACTION_INDEX_TABLE)?;
            let _ = write_txn.open_table(PENDING_ORDERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// Blocks while another write transaction is in flight; dropping the
    /// transaction without committing rolls back every change made in it.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Item Operations ==========

    /// Store an item (within transaction). The id must already be assigned.
    pub fn put_item_txn(&self, txn: &WriteTransaction, item: &Item) -> StorageResult<()> {
        let id = item.id.as_deref().unwrap_or_default();
        let bytes = serde_json::to_vec(item)?;
        let mut table = txn.open_table(ITEMS_TABLE)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    /// Load an item (within transaction, sees uncommitted writes)
    pub fn get_item_txn(&self, txn: &WriteTransaction, id: &str) -> StorageResult<Option<Item>> {
        let table = txn.open_table(ITEMS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an item (read snapshot)
    pub fn get_item(&self, id: &str) -> StorageResult<Option<Item>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All items (read snapshot)
    pub fn list_items(&self) -> StorageResult<Vec<Item>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS_TABLE)?;
        let mut items = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }

    // ========== Order Operations ==========

    /// Store an order (within transaction)
    pub fn put_order_txn(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let id = order.id.as_deref().unwrap_or_default();
        let bytes = serde_json::to_vec(order)?;
        let mut table = txn.open_table(ORDERS_TABLE)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    /// Load an order (within transaction, sees uncommitted writes)
    pub fn get_order_txn(&self, txn: &WriteTransaction, id: &str) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an order (read snapshot)
    pub fn get_order(&self, id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All orders (read snapshot)
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// Claim a transaction id (within transaction)
    ///
    /// Returns `false` when the id is already taken, leaving the existing
    /// mapping untouched.
    pub fn insert_transaction_id_txn(
        &self,
        txn: &WriteTransaction,
        transaction_id: &str,
        order_id: &str,
    ) -> StorageResult<bool> {
        let mut table = txn.open_table(TRANSACTION_INDEX_TABLE)?;
        if table.get(transaction_id)?.is_some() {
            return Ok(false);
        }
        table.insert(transaction_id, order_id)?;
        Ok(true)
    }

    /// Index an order as pending (within transaction)
    pub fn set_pending_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        created_at: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PENDING_ORDERS_TABLE)?;
        table.insert(order_id, created_at)?;
        Ok(())
    }

    /// Drop an order from the pending index (within transaction)
    pub fn clear_pending_txn(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(PENDING_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Pending orders with their creation timestamps (read snapshot)
    pub fn list_pending(&self) -> StorageResult<Vec<(String, i64)>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_ORDERS_TABLE)?;
        let mut pending = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            pending.push((key.value().to_string(), value.value()));
        }
        Ok(pending)
    }

    // ========== Cart Operations ==========

    /// Load a user's cart entries (within transaction); absent cart is empty
    pub fn get_cart_txn(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
    ) -> StorageResult<Vec<CartEntry>> {
        let table = txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Vec::new()),
        }
    }

    /// Store a user's cart entries (within transaction); empty carts are
    /// removed instead of stored
    pub fn put_cart_txn(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
        entries: &[CartEntry],
    ) -> StorageResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        if entries.is_empty() {
            table.remove(user_id)?;
        } else {
            let bytes = serde_json::to_vec(entries)?;
            table.insert(user_id, bytes.as_slice())?;
        }
        Ok(())
    }

    /// Remove a user's cart wholesale (within transaction)
    pub fn clear_cart_txn(&self, txn: &WriteTransaction, user_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        table.remove(user_id)?;
        Ok(())
    }

    /// Load a user's cart entries (read snapshot); absent cart is empty
    pub fn get_cart(&self, user_id: &str) -> StorageResult<Vec<CartEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        match table.get(user_id)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Vec::new()),
        }
    }

    // ========== User Operations ==========

    /// Store a user display record (within transaction)
    pub fn put_user_txn(&self, txn: &WriteTransaction, user: &User) -> StorageResult<()> {
        let id = user.id.as_deref().unwrap_or_default();
        let bytes = serde_json::to_vec(user)?;
        let mut table = txn.open_table(USERS_TABLE)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    /// Load a user display record (read snapshot)
    pub fn get_user(&self, id: &str) -> StorageResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for CheckoutStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutStorage").finish_non_exhaustive()
    }
}
