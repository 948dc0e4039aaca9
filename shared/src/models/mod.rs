//! Domain models for the Hermit marketplace

pub mod cart;
pub mod item;
pub mod order;
pub mod user;

pub use cart::{CartAdd, CartEntry, CartEntryDetail, CartUpdate};
pub use item::{Item, ItemCreate};
pub use order::{
    CheckoutReceipt, HandoffResult, LineItem, Order, OrderCreate, OrderLineInput, OrderRole,
    OrderStatus, OrderView, RegeneratedCode, VerifyHandoff,
};
pub use user::{User, UserSummary};
