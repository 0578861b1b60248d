//! Fleet listing endpoint: GET /api/buses
//!
//! Response: `[{ "id": "BUS-01", "name": "Bus 1", "route": "...", "color": "#e74c3c", "isActive": true }]`
//!
//! Tokens are never part of the listing.

use axum::{extract::State, Json};
use bustrack_protocol::api::BusSummary;
use std::sync::Arc;

use crate::app::AppState;

/// GET /api/buses: every registered bus in id order, with live status.
pub async fn buses_handler(State(state): State<Arc<AppState>>) -> Json<Vec<BusSummary>> {
    let sessions = state.lifecycle.sessions();
    let buses = sessions
        .registry()
        .iter()
        .map(|profile| BusSummary {
            id: profile.id.to_string(),
            name: profile.name.clone(),
            route: profile.route.clone(),
            color: profile.color.clone(),
            is_active: sessions.is_active(profile.id.as_str()),
        })
        .collect();
    Json(buses)
}
