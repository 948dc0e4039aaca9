//! Item API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_LABEL_LEN, MAX_NAME_LEN, validate_record_id, validate_required_text,
};
use crate::utils::{ApiResponse, AppResult};
use shared::models::{Item, ItemCreate};

/// List all listings, newest first
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<ApiResponse<Vec<Item>>> {
    let items = state.checkout.list_items()?;
    Ok(ApiResponse::success(items))
}

/// Fetch a single listing
pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Item>> {
    validate_record_id(&id, "item id")?;
    let item = state.checkout.get_item(&id)?;
    Ok(ApiResponse::success(item))
}

/// Create a listing owned by the caller
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ItemCreate>,
) -> AppResult<ApiResponse<Item>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_required_text(&payload.category, "category", MAX_LABEL_LEN)?;

    let item = state.checkout.create_item(&user.id, payload)?;
    Ok(ApiResponse::success(item))
}
