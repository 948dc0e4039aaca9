//! Checkout and delivery-confirmation engine
//!
//! This module implements the transactional core of the marketplace:
//!
//! - **storage**: redb-based persistence for items, orders, carts and users
//! - **ledger**: authoritative per-item stock with atomic reserve/release
//! - **cart**: per-user carts, independent of the ledger until checkout
//! - **handoff**: one-time code generation and hash verification
//! - **manager**: order factory and lifecycle (pending → completed/canceled)
//! - **expiry**: background sweeper that cancels stale pending orders
//!
//! # Architecture
//!
//! ```text
//! Cart ──> CheckoutManager ──> Ledger reserve ──> Order (pending)
//!                 │                                   │
//!             Broadcast                        verify_handoff
//!                 │                                   │
//!          All Subscribers                     completed / canceled
//! ```
//!
//! Every state change commits through a single redb write transaction:
//! stock checks and decrements are never split, multi-line orders are
//! all-or-nothing, and lifecycle transitions re-validate inside the
//! transaction so they fire exactly once.

pub mod cart;
pub mod error;
pub mod expiry;
pub mod handoff;
pub mod ledger;
pub mod manager;
pub mod storage;

// Re-exports
pub use cart::CartStore;
pub use error::{CheckoutError, CheckoutResult};
pub use expiry::ExpiryScheduler;
pub use ledger::InventoryLedger;
pub use manager::{CheckoutEvent, CheckoutEventKind, CheckoutManager};
pub use storage::{CheckoutStorage, StorageError};
