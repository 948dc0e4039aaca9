//! CheckoutManager - order creation and delivery confirmation
//!
//! This module turns carts into committed orders and drives the order
//! lifecycle. It handles:
//! - Line validation (ownership, single seller, quantities)
//! - Atomic multi-line stock reservation and order persistence
//! - Handoff code issue / verify / regenerate
//! - Cancellation with inventory restitution
//! - Event broadcasting (via tokio broadcast)
//!
//! # Order Flow
//!
//! ```text
//! create_order(buyer, lines)
//!     ├─ 1. Merge and validate lines
//!     ├─ 2. Generate handoff code + hash (outside the write transaction)
//!     ├─ 3. Begin write transaction
//!     ├─ 4. Reserve stock per line (ledger), enforce single seller
//!     ├─ 5. Claim a unique transaction id (retry on collision)
//!     ├─ 6. Persist order (pending) + pending index
//!     ├─ 7. Commit — all lines or none
//!     ├─ 8. Broadcast OrderCreated
//!     └─ 9. Return order + plaintext code (single exposure)
//! ```
//!
//! Handoff verification runs the slow hash comparison against a read
//! snapshot, then re-validates status and code version inside the write
//! transaction before flipping the state. Two concurrent verifications of
//! the same order can therefore never both succeed, and a verification
//! racing a regeneration loses.

use super::cart::CartStore;
use super::error::{CheckoutError, CheckoutResult};
use super::handoff;
use super::ledger::InventoryLedger;
use super::storage::{CheckoutStorage, StorageError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{
    HandoffResult, Item, ItemCreate, LineItem, Order, OrderLineInput, OrderRole, OrderStatus,
    OrderView, User, UserSummary,
};
use shared::util::{now_millis, record_id};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Attempts at minting a unique transaction id before giving up
const TRANSACTION_ID_RETRIES: u32 = 3;

/// Checkout event kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutEventKind {
    OrderCreated,
    OrderCompleted,
    OrderCanceled,
    CodeRegenerated,
}

/// Broadcast event emitted after a state change commits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutEvent {
    pub order_id: String,
    pub kind: CheckoutEventKind,
    pub timestamp: i64,
}

/// CheckoutManager for order processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and refetch state.
pub struct CheckoutManager {
    storage: CheckoutStorage,
    ledger: InventoryLedger,
    cart: CartStore,
    event_tx: broadcast::Sender<CheckoutEvent>,
    epoch: String,
}

impl std::fmt::Debug for CheckoutManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutManager")
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl CheckoutManager {
    /// Create a new CheckoutManager with the given database path
    pub fn open(db_path: impl AsRef<Path>) -> CheckoutResult<Self> {
        let storage = CheckoutStorage::open(db_path).map_err(CheckoutError::Storage)?;
        Ok(Self::with_storage(storage))
    }

    /// Create a CheckoutManager over existing storage
    pub fn with_storage(storage: CheckoutStorage) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "CheckoutManager started with new epoch");
        Self {
            ledger: InventoryLedger::new(storage.clone()),
            cart: CartStore::new(storage.clone()),
            storage,
            event_tx,
            epoch,
        }
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// The cart store
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The inventory ledger
    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<CheckoutEvent> {
        self.event_tx.subscribe()
    }

    fn broadcast(&self, order_id: &str, kind: CheckoutEventKind) {
        let event = CheckoutEvent {
            order_id: order_id.to_string(),
            kind,
            timestamp: now_millis(),
        };
        // No receivers is fine; events are advisory
        let _ = self.event_tx.send(event);
    }

    // ========== Listings ==========

    /// Create a listing on behalf of `seller`
    pub fn create_item(&self, seller: &str, data: ItemCreate) -> CheckoutResult<Item> {
        if data.price < Decimal::ZERO {
            return Err(CheckoutError::InvalidPrice(format!(
                "price must be non-negative, got {}",
                data.price
            )));
        }

        let now = now_millis();
        let item = Item {
            id: Some(record_id("item")),
            seller: seller.to_string(),
            name: data.name,
            description: data.description,
            category: data.category,
            price: data.price,
            stock: data.stock,
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        self.storage.put_item_txn(&txn, &item)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(item_id = %item.id.as_deref().unwrap_or_default(), seller, "Listing created");
        Ok(item)
    }

    /// All listings, newest first
    pub fn list_items(&self) -> CheckoutResult<Vec<Item>> {
        let mut items = self.storage.list_items()?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// Fetch a listing by id
    pub fn get_item(&self, item_id: &str) -> CheckoutResult<Item> {
        self.storage
            .get_item(item_id)?
            .ok_or_else(|| CheckoutError::ItemNotFound(item_id.to_string()))
    }

    // ========== Users ==========

    /// Write a user display record (the external auth system's sync path)
    pub fn upsert_user(&self, mut user: User) -> CheckoutResult<User> {
        if user.id.is_none() {
            user.id = Some(record_id("user"));
        }
        let txn = self.storage.begin_write()?;
        self.storage.put_user_txn(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(user)
    }

    // ========== Order creation ==========

    /// Create an order from explicit lines
    ///
    /// Returns the committed order and the plaintext handoff code. The code
    /// is shown to the buyer exactly once and cannot be re-derived.
    pub fn create_order(
        &self,
        buyer: &str,
        lines: &[OrderLineInput],
    ) -> CheckoutResult<(Order, String)> {
        let lines = merge_lines(lines)?;
        // Argon2 is deliberately slow; hash before taking the write
        // transaction so other writers are not stalled behind it.
        let (code, hash) = handoff::generate()?;
        let now = now_millis();

        let txn = self.storage.begin_write()?;
        let order = self.create_order_txn(&txn, buyer, &lines, hash, now)?;
        txn.commit().map_err(StorageError::from)?;

        let order_id = order.id.clone().unwrap_or_default();
        self.broadcast(&order_id, CheckoutEventKind::OrderCreated);
        tracing::info!(
            order_id = %order_id,
            buyer,
            seller = %order.seller,
            amount = %order.amount,
            lines = order.lines.len(),
            "Order created"
        );
        Ok((order, code))
    }

    /// Create an order from the buyer's live cart, clearing the cart in the
    /// same transaction
    pub fn checkout_cart(&self, buyer: &str) -> CheckoutResult<(Order, String)> {
        let (code, hash) = handoff::generate()?;
        let now = now_millis();

        let txn = self.storage.begin_write()?;
        let entries = self.storage.get_cart_txn(&txn, buyer)?;
        if entries.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }
        let lines: Vec<OrderLineInput> = entries
            .iter()
            .map(|e| OrderLineInput {
                item_id: e.item.clone(),
                quantity: e.quantity,
            })
            .collect();
        let order = self.create_order_txn(&txn, buyer, &lines, hash, now)?;
        self.storage.clear_cart_txn(&txn, buyer)?;
        txn.commit().map_err(StorageError::from)?;

        let order_id = order.id.clone().unwrap_or_default();
        self.broadcast(&order_id, CheckoutEventKind::OrderCreated);
        tracing::info!(
            order_id = %order_id,
            buyer,
            seller = %order.seller,
            amount = %order.amount,
            "Cart checked out"
        );
        Ok((order, code))
    }

    /// Reserve stock, compute the total, and persist the order — all within
    /// the caller's transaction. Any error aborts the transaction, so no
    /// partial order and no dangling reservation can be observed.
    fn create_order_txn(
        &self,
        txn: &redb::WriteTransaction,
        buyer: &str,
        lines: &[OrderLineInput],
        handoff_hash: String,
        now: i64,
    ) -> CheckoutResult<Order> {
        let mut seller: Option<String> = None;
        let mut line_items = Vec::with_capacity(lines.len());
        let mut amount = Decimal::ZERO;

        for line in lines {
            let item = self.ledger.reserve_txn(txn, &line.item_id, line.quantity)?;
            if item.seller == buyer {
                return Err(CheckoutError::SelfPurchase(line.item_id.clone()));
            }
            match &seller {
                None => seller = Some(item.seller.clone()),
                Some(s) if *s != item.seller => {
                    return Err(CheckoutError::MultipleSellers {
                        first: s.clone(),
                        second: item.seller.clone(),
                    });
                }
                Some(_) => {}
            }
            amount += item.price * Decimal::from(line.quantity);
            line_items.push(LineItem {
                item: line.item_id.clone(),
                name: item.name,
                price: item.price,
                quantity: line.quantity,
            });
        }
        let seller = seller.ok_or(CheckoutError::EmptyOrder)?;

        let order_id = record_id("order");
        let mut transaction_id = handoff::new_transaction_id();
        let mut attempts = 1;
        while !self
            .storage
            .insert_transaction_id_txn(txn, &transaction_id, &order_id)?
        {
            if attempts >= TRANSACTION_ID_RETRIES {
                return Err(CheckoutError::DuplicateTransactionId(transaction_id));
            }
            attempts += 1;
            transaction_id = handoff::new_transaction_id();
        }

        let order = Order {
            id: Some(order_id.clone()),
            transaction_id,
            buyer: buyer.to_string(),
            seller,
            lines: line_items,
            amount,
            handoff_hash,
            handoff_version: 0,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.storage.put_order_txn(txn, &order)?;
        self.storage.set_pending_txn(txn, &order_id, now)?;
        Ok(order)
    }

    // ========== Order queries ==========

    /// Fetch an order; only its buyer or seller may see it
    pub fn get_order(&self, order_id: &str, caller: &str) -> CheckoutResult<Order> {
        let order = self
            .storage
            .get_order(order_id)?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        if order.buyer != caller && order.seller != caller {
            return Err(CheckoutError::NotOrderParty(order_id.to_string()));
        }
        Ok(order)
    }

    /// Orders where `user` acts in the given role, newest first, with
    /// buyer/seller resolved to display summaries
    pub fn list_orders(&self, user: &str, role: OrderRole) -> CheckoutResult<Vec<OrderView>> {
        let mut orders: Vec<Order> = self
            .storage
            .list_orders()?
            .into_iter()
            .filter(|o| match role {
                OrderRole::Buyer => o.buyer == user,
                OrderRole::Seller => o.seller == user,
            })
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut summaries: HashMap<String, UserSummary> = HashMap::new();
        let mut views = Vec::with_capacity(orders.len());
        for order in &orders {
            let buyer = self.resolve_summary(&mut summaries, &order.buyer)?;
            let seller = self.resolve_summary(&mut summaries, &order.seller)?;
            views.push(OrderView::from_order(order, buyer, seller));
        }
        Ok(views)
    }

    /// Fetch one order as its API projection (summaries resolved, hash hidden)
    pub fn get_order_view(&self, order_id: &str, caller: &str) -> CheckoutResult<OrderView> {
        let order = self.get_order(order_id, caller)?;
        let mut cache = HashMap::new();
        let buyer = self.resolve_summary(&mut cache, &order.buyer)?;
        let seller = self.resolve_summary(&mut cache, &order.seller)?;
        Ok(OrderView::from_order(&order, buyer, seller))
    }

    fn resolve_summary(
        &self,
        cache: &mut HashMap<String, UserSummary>,
        user_id: &str,
    ) -> CheckoutResult<UserSummary> {
        if let Some(summary) = cache.get(user_id) {
            return Ok(summary.clone());
        }
        let summary = match self.storage.get_user(user_id)? {
            Some(user) => UserSummary::from(&user),
            None => UserSummary::unresolved(user_id),
        };
        cache.insert(user_id.to_string(), summary.clone());
        Ok(summary)
    }

    // ========== Handoff ==========

    /// Verify a presented handoff code and complete the order
    ///
    /// Only the seller may verify; the order must be pending; a failed
    /// verification changes nothing.
    pub fn verify_handoff(
        &self,
        order_id: &str,
        caller: &str,
        code: &str,
    ) -> CheckoutResult<HandoffResult> {
        // Phase 1: checks and the slow hash comparison against a read
        // snapshot; no write lock is held while argon2 runs.
        let order = self
            .storage
            .get_order(order_id)?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        if order.seller != caller {
            return Err(CheckoutError::NotOrderSeller(order_id.to_string()));
        }
        if order.status != OrderStatus::Pending {
            return Err(CheckoutError::OrderNotPending {
                order: order_id.to_string(),
                status: order.status,
            });
        }
        let seen_version = order.handoff_version;
        if !handoff::verify_code(code, &order.handoff_hash)? {
            tracing::warn!(order_id, "Handoff verification rejected: code mismatch");
            return Err(CheckoutError::InvalidHandoffCode);
        }

        // Phase 2: transactional state flip with re-validation. A concurrent
        // verify or regenerate that committed since phase 1 loses here.
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        if !order.status.can_transition_to(OrderStatus::Completed) {
            return Err(CheckoutError::OrderNotPending {
                order: order_id.to_string(),
                status: order.status,
            });
        }
        if order.handoff_version != seen_version {
            // Code was rotated between the snapshot and this transaction
            return Err(CheckoutError::InvalidHandoffCode);
        }
        order.status = OrderStatus::Completed;
        order.updated_at = now_millis();
        self.storage.put_order_txn(&txn, &order)?;
        self.storage.clear_pending_txn(&txn, order_id)?;
        txn.commit().map_err(StorageError::from)?;

        self.broadcast(order_id, CheckoutEventKind::OrderCompleted);
        tracing::info!(order_id, seller = caller, "Order completed via handoff");
        Ok(HandoffResult {
            order_id: order_id.to_string(),
            status: OrderStatus::Completed,
        })
    }

    /// Replace the handoff code with a fresh one
    ///
    /// Only the buyer may regenerate; the previous code is invalid the
    /// moment the transaction commits. Returns the new plaintext once.
    pub fn regenerate_code(&self, order_id: &str, caller: &str) -> CheckoutResult<String> {
        // Cheap pre-checks before paying for a hash
        let order = self
            .storage
            .get_order(order_id)?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        if order.buyer != caller {
            return Err(CheckoutError::NotOrderBuyer(order_id.to_string()));
        }
        if order.status != OrderStatus::Pending {
            return Err(CheckoutError::OrderNotPending {
                order: order_id.to_string(),
                status: order.status,
            });
        }

        let (code, hash) = handoff::generate()?;

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        if order.buyer != caller {
            return Err(CheckoutError::NotOrderBuyer(order_id.to_string()));
        }
        if order.status != OrderStatus::Pending {
            return Err(CheckoutError::OrderNotPending {
                order: order_id.to_string(),
                status: order.status,
            });
        }
        order.handoff_hash = hash;
        order.handoff_version += 1;
        order.updated_at = now_millis();
        self.storage.put_order_txn(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        self.broadcast(order_id, CheckoutEventKind::CodeRegenerated);
        tracing::info!(order_id, buyer = caller, "Handoff code regenerated");
        Ok(code)
    }

    // ========== Cancellation ==========

    /// Buyer-initiated cancellation with inventory restitution
    pub fn cancel_order(&self, order_id: &str, caller: &str) -> CheckoutResult<Order> {
        let order = self
            .storage
            .get_order(order_id)?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        if order.buyer != caller {
            return Err(CheckoutError::NotOrderBuyer(order_id.to_string()));
        }
        self.cancel_internal(order_id)
    }

    /// Cancel a pending order and release every reserved unit, atomically
    fn cancel_internal(&self, order_id: &str) -> CheckoutResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        if !order.status.can_transition_to(OrderStatus::Canceled) {
            return Err(CheckoutError::OrderNotPending {
                order: order_id.to_string(),
                status: order.status,
            });
        }
        for line in &order.lines {
            self.ledger.release_txn(&txn, &line.item, line.quantity)?;
        }
        order.status = OrderStatus::Canceled;
        order.updated_at = now_millis();
        self.storage.put_order_txn(&txn, &order)?;
        self.storage.clear_pending_txn(&txn, order_id)?;
        txn.commit().map_err(StorageError::from)?;

        self.broadcast(order_id, CheckoutEventKind::OrderCanceled);
        tracing::info!(order_id, "Order canceled, stock released");
        Ok(order)
    }

    /// Cancel pending orders older than `ttl_ms`
    ///
    /// Returns how many were canceled. A failure on one order is logged and
    /// leaves it pending for the next sweep; it does not abort the pass.
    pub fn sweep_expired(&self, ttl_ms: i64) -> usize {
        let cutoff = now_millis() - ttl_ms;
        let pending = match self.storage.list_pending() {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan pending orders");
                return 0;
            }
        };

        let mut canceled = 0;
        for (order_id, created_at) in pending {
            if created_at > cutoff {
                continue;
            }
            match self.cancel_internal(&order_id) {
                Ok(_) => {
                    canceled += 1;
                    tracing::info!(order_id = %order_id, "Pending order expired and canceled");
                }
                // Completed or canceled between the scan and the transaction
                Err(CheckoutError::OrderNotPending { .. }) => {}
                Err(e) => {
                    tracing::error!(
                        order_id = %order_id,
                        error = %e,
                        "Expiry cancellation failed, order left for reconciliation"
                    );
                }
            }
        }
        canceled
    }
}

/// Merge duplicate item lines and validate quantities
fn merge_lines(lines: &[OrderLineInput]) -> CheckoutResult<Vec<OrderLineInput>> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }
    let mut merged: Vec<OrderLineInput> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity == 0 {
            return Err(CheckoutError::InvalidQuantity(line.item_id.clone()));
        }
        match merged.iter_mut().find(|l| l.item_id == line.item_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| CheckoutError::InvalidQuantity(line.item_id.clone()))?;
            }
            None => merged.push(line.clone()),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests;
