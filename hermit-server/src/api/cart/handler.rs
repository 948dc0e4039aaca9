//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::validate_record_id;
use crate::utils::{ApiResponse, AppResult};
use shared::models::{CartAdd, CartEntry, CartEntryDetail, CartUpdate};

/// Cart entries with resolved listing details
pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<ApiResponse<Vec<CartEntryDetail>>> {
    let entries = state.checkout.cart().list(&user.id)?;
    Ok(ApiResponse::success(entries))
}

/// Add an item to the cart (merges with an existing entry)
pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CartAdd>,
) -> AppResult<ApiResponse<CartEntry>> {
    validate_record_id(&payload.item_id, "item_id")?;
    let entry = state
        .checkout
        .cart()
        .add(&user.id, &payload.item_id, payload.quantity)?;
    Ok(ApiResponse::success(entry))
}

/// Set the quantity of an existing entry
pub async fn update_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
    Json(payload): Json<CartUpdate>,
) -> AppResult<ApiResponse<CartEntry>> {
    validate_record_id(&item_id, "item_id")?;
    let entry = state
        .checkout
        .cart()
        .update(&user.id, &item_id, payload.quantity)?;
    Ok(ApiResponse::success(entry))
}

/// Remove an entry from the cart
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    validate_record_id(&item_id, "item_id")?;
    state.checkout.cart().remove(&user.id, &item_id)?;
    Ok(ApiResponse::ok())
}
