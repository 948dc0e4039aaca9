//! Order API Handlers
//!
//! Order creation, handoff verification and regeneration run the engine's
//! blocking path (argon2 + storage transaction) on the blocking pool.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::validate_record_id;
use crate::utils::{ApiResponse, AppError, AppResult};
use shared::models::{
    CheckoutReceipt, HandoffResult, Order, OrderCreate, OrderRole, OrderView, RegeneratedCode,
    VerifyHandoff,
};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Which side of the order the caller is on
    pub role: OrderRole,
}

fn receipt(order: Order, handoff_code: String) -> CheckoutReceipt {
    CheckoutReceipt {
        order_id: order.id.unwrap_or_default(),
        transaction_id: order.transaction_id,
        handoff_code,
        amount: order.amount,
    }
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::internal(format!("checkout task failed: {}", e))
}

/// Create an order from explicit lines
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<ApiResponse<CheckoutReceipt>> {
    let manager = state.checkout.clone();
    let buyer = user.id;
    let (order, code) =
        tokio::task::spawn_blocking(move || manager.create_order(&buyer, &payload.lines))
            .await
            .map_err(join_error)??;
    Ok(ApiResponse::success(receipt(order, code)))
}

/// Create an order from the caller's cart, clearing it on success
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<CheckoutReceipt>> {
    let manager = state.checkout.clone();
    let buyer = user.id;
    let (order, code) = tokio::task::spawn_blocking(move || manager.checkout_cart(&buyer))
        .await
        .map_err(join_error)??;
    Ok(ApiResponse::success(receipt(order, code)))
}

/// Orders for the caller in the requested role, newest first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<OrderView>>> {
    let orders = state.checkout.list_orders(&user.id, query.role)?;
    Ok(ApiResponse::success(orders))
}

/// Fetch one order; only the buyer or the seller may see it
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderView>> {
    validate_record_id(&id, "order id")?;
    let view = state.checkout.get_order_view(&id, &user.id)?;
    Ok(ApiResponse::success(view))
}

/// Seller presents the buyer's handoff code to complete the order
pub async fn verify(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<VerifyHandoff>,
) -> AppResult<ApiResponse<HandoffResult>> {
    validate_record_id(&id, "order id")?;
    let manager = state.checkout.clone();
    let caller = user.id;
    let result =
        tokio::task::spawn_blocking(move || manager.verify_handoff(&id, &caller, &payload.code))
            .await
            .map_err(join_error)??;
    Ok(ApiResponse::success(result))
}

/// Buyer rotates the handoff code; the previous code stops working
pub async fn regenerate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RegeneratedCode>> {
    validate_record_id(&id, "order id")?;
    let manager = state.checkout.clone();
    let caller = user.id;
    let handoff_code =
        tokio::task::spawn_blocking(move || manager.regenerate_code(&id, &caller))
            .await
            .map_err(join_error)??;
    Ok(ApiResponse::success(RegeneratedCode { handoff_code }))
}

/// Buyer cancels a pending order; reserved stock is released
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<OrderView>> {
    validate_record_id(&id, "order id")?;
    state.checkout.cancel_order(&id, &user.id)?;
    let view = state.checkout.get_order_view(&id, &user.id)?;
    Ok(ApiResponse::success(view))
}
