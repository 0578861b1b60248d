use bustrack_core::{ConnId, PublisherId};
use chrono::{DateTime, Utc};

const MPS_TO_KMH: f64 = 3.6;

/// One reading from a publisher's position sensor, in sensor units.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReading {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters per second.
    pub speed: Option<f64>,
    /// Degrees clockwise from north.
    pub heading: Option<f64>,
    /// Meters.
    pub accuracy: Option<f64>,
}

impl PositionReading {
    /// Normalize into broadcast units. `None` for a malformed reading.
    pub fn normalize(&self) -> Option<Position> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lng_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if !lat_ok || !lng_ok {
            return None;
        }
        Some(Position {
            lat: self.latitude,
            lng: self.longitude,
            speed_kmh: speed_to_kmh(self.speed),
            heading: self.heading.filter(|h| h.is_finite()).unwrap_or(0.0),
        })
    }
}

/// m/s → km/h rounded to the nearest integer; missing or nonsensical is 0.
pub fn speed_to_kmh(speed_mps: Option<f64>) -> u32 {
    match speed_mps {
        // float → int casts saturate, so absurd speeds clamp to u32::MAX
        Some(mps) if mps.is_finite() && mps > 0.0 => (mps * MPS_TO_KMH).round() as u32,
        _ => 0,
    }
}

/// Last accepted position of a publisher, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    pub speed_kmh: u32,
    pub heading: f64,
}

/// The live binding between a publisher and the connection currently
/// speaking for it.
#[derive(Debug, Clone)]
pub struct PublisherSession {
    pub publisher_id: PublisherId,
    /// Unknown until the first reading is accepted.
    pub position: Option<Position>,
    pub last_update: Option<DateTime<Utc>>,
    pub conn: ConnId,
}

impl PublisherSession {
    pub fn new(publisher_id: PublisherId, conn: ConnId) -> Self {
        Self {
            publisher_id,
            position: None,
            last_update: None,
            conn,
        }
    }
}

/// Events fanned out to every connected party.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastEvent {
    PublisherActivated {
        id: PublisherId,
        name: String,
        route: String,
        color: String,
    },
    PublisherDeactivated {
        id: PublisherId,
    },
    PositionUpdated {
        id: PublisherId,
        lat: f64,
        lng: f64,
        speed: u32,
        heading: f64,
    },
}

impl BroadcastEvent {
    pub fn position_updated(id: &PublisherId, position: &Position) -> Self {
        BroadcastEvent::PositionUpdated {
            id: id.clone(),
            lat: position.lat,
            lng: position.lng,
            speed: position.speed_kmh,
            heading: position.heading,
        }
    }

    pub fn publisher_id(&self) -> &PublisherId {
        match self {
            BroadcastEvent::PublisherActivated { id, .. }
            | BroadcastEvent::PublisherDeactivated { id }
            | BroadcastEvent::PositionUpdated { id, .. } => id,
        }
    }
}
