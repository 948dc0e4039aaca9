//! Orders API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/checkout", post(handler::checkout))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/verify", post(handler::verify))
        .route("/{id}/regenerate", post(handler::regenerate))
        .route("/{id}/cancel", post(handler::cancel))
}
