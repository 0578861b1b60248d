//! Driver token check: POST /api/verify-token
//!
//! Lets the driver client confirm its secret before opening the event
//! channel. Always answers 200; the body says whether the token matched.
//!
//! Request:  `{"token": "..."}`
//! Response: `{"success": true, "busId": "...", "name": "...", "route": "..."}`
//!       or  `{"success": false, "message": "..."}`

use axum::{extract::State, Json};
use bustrack_protocol::api::{VerifyTokenRequest, VerifyTokenResponse};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;

const REJECTED_MESSAGE: &str = "Invalid token. Please check with admin.";

/// POST /api/verify-token: resolve a secret to its bus without echoing it.
pub async fn verify_token_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyTokenRequest>,
) -> Json<VerifyTokenResponse> {
    let auth = state.lifecycle.sessions().authenticator();
    match auth.authenticate(&req.token) {
        Ok(profile) => {
            info!(bus_id = %profile.id, "token verified");
            Json(VerifyTokenResponse::verified(
                profile.id.as_str(),
                &profile.name,
                &profile.route,
            ))
        }
        Err(e) => {
            warn!(code = e.code(), "token verification failed");
            Json(VerifyTokenResponse::rejected(REJECTED_MESSAGE))
        }
    }
}
