//! Health API 模块

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use shared::util::now_millis;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Debug, Serialize)]
struct HealthInfo {
    status: &'static str,
    /// Server instance epoch; changes on every restart
    epoch: String,
    timestamp: i64,
}

async fn health(State(state): State<ServerState>) -> Json<HealthInfo> {
    Json(HealthInfo {
        status: "ok",
        epoch: state.checkout.epoch().to_string(),
        timestamp: now_millis(),
    })
}
