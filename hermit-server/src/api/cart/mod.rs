//! Cart API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_cart))
        .route("/items", post(handler::add_item))
        .route(
            "/items/{item_id}",
            put(handler::update_item).delete(handler::remove_item),
        )
}
