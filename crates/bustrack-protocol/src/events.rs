// Event-channel names, one constant per wire event.

use serde::{Deserialize, Serialize};

// client → server
pub const DRIVER_START: &str = "driver:start";
pub const DRIVER_LOCATION: &str = "driver:location";
pub const STUDENT_GET_ACTIVE_BUSES: &str = "student:getActiveBuses";

// server → requesting client only
pub const DRIVER_CONFIRMED: &str = "driver:confirmed";
pub const DRIVER_ERROR: &str = "driver:error";

// server → everyone
pub const BUS_ACTIVATED: &str = "bus:activated";
pub const BUS_DEACTIVATED: &str = "bus:deactivated";
pub const BUS_LOCATION: &str = "bus:location";

/// `driver:start`: authenticate and open (or replace) a publisher session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStart {
    pub bus_id: String,
    pub token: String,
}

/// `driver:location`: one raw sensor reading, speed in meters per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocation {
    pub bus_id: String,
    pub token: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverConfirmed {
    pub bus_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusActivated {
    pub bus_id: String,
    pub name: String,
    pub route: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusDeactivated {
    pub bus_id: String,
}

/// `bus:location`: normalized fan-out, speed in whole km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusLocation {
    pub bus_id: String,
    pub lat: f64,
    pub lng: f64,
    pub speed: u32,
    pub heading: f64,
}
