use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe, returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "connections": state.lifecycle.hub().recipient_count(),
        "activeBuses": state.lifecycle.sessions().active_count(),
        "queueCapacity": state.config.broadcast.queue_capacity,
    }))
}
