//! Conversion of core events and direct replies into wire frames.

use bustrack_protocol::events::{
    BusActivated, BusDeactivated, BusLocation, DriverConfirmed, DriverError, BUS_ACTIVATED,
    BUS_DEACTIVATED, BUS_LOCATION, DRIVER_CONFIRMED, DRIVER_ERROR,
};
use bustrack_protocol::frames::EventFrame;
use bustrack_sessions::BroadcastEvent;

pub fn broadcast_frame(event: &BroadcastEvent) -> EventFrame {
    match event {
        BroadcastEvent::PublisherActivated {
            id,
            name,
            route,
            color,
        } => EventFrame::new(
            BUS_ACTIVATED,
            BusActivated {
                bus_id: id.to_string(),
                name: name.clone(),
                route: route.clone(),
                color: color.clone(),
            },
        ),
        BroadcastEvent::PublisherDeactivated { id } => EventFrame::new(
            BUS_DEACTIVATED,
            BusDeactivated {
                bus_id: id.to_string(),
            },
        ),
        BroadcastEvent::PositionUpdated {
            id,
            lat,
            lng,
            speed,
            heading,
        } => EventFrame::new(
            BUS_LOCATION,
            BusLocation {
                bus_id: id.to_string(),
                lat: *lat,
                lng: *lng,
                speed: *speed,
                heading: *heading,
            },
        ),
    }
}

pub fn confirmed_frame(confirmed: &DriverConfirmed) -> EventFrame {
    EventFrame::new(DRIVER_CONFIRMED, confirmed)
}

pub fn error_frame(message: impl Into<String>) -> EventFrame {
    EventFrame::new(
        DRIVER_ERROR,
        DriverError {
            message: message.into(),
        },
    )
}
