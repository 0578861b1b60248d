//! Request/response bodies of the HTTP bootstrap API.
//!
//! Neither body ever carries a publisher's secret back to the caller.

use serde::{Deserialize, Serialize};

/// `POST /api/verify-token` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// `POST /api/verify-token` response.
///
/// Success: `{ "success": true, "busId": "BUS-01", "name": "Bus 1", "route": "..." }`
/// Failure: `{ "success": false, "message": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerifyTokenResponse {
    pub fn verified(bus_id: &str, name: &str, route: &str) -> Self {
        Self {
            success: true,
            bus_id: Some(bus_id.to_string()),
            name: Some(name.to_string()),
            route: Some(route.to_string()),
            message: None,
        }
    }

    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            bus_id: None,
            name: None,
            route: None,
            message: Some(message.to_string()),
        }
    }
}

/// One entry of `GET /api/buses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusSummary {
    pub id: String,
    pub name: String,
    pub route: String,
    pub color: String,
    pub is_active: bool,
}
