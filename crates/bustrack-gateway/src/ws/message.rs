use bustrack_core::error::BusTrackError;
use bustrack_protocol::{
    events::{DriverLocation, DriverStart, DRIVER_LOCATION, DRIVER_START, STUDENT_GET_ACTIVE_BUSES},
    frames::{EventFrame, InboundFrame},
};
use bustrack_sessions::hub::EventReceiver;
use bustrack_sessions::Connection;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::AppState;
use crate::ws::outbound;
use crate::ws::send::{self, WsSink};

/// Process one inbound WS text frame.
///
/// An `Err` means the connection must be closed: either the frame broke the
/// size limit or the socket can no longer be written to.
pub async fn handle(
    conn: &mut Connection,
    text: &str,
    tx: &mut WsSink,
    events: &mut EventReceiver,
    app: &Arc<AppState>,
) -> Result<(), axum::Error> {
    let frame = match InboundFrame::parse(text) {
        Ok(f) => f,
        Err(e @ BusTrackError::PayloadTooLarge { .. }) => {
            warn!(conn_id = %conn.id(), error = %e, "payload too large");
            return Err(axum::Error::new(e));
        }
        Err(e) => {
            warn!(conn_id = %conn.id(), error = %e, "malformed frame");
            return Ok(());
        }
    };

    for out in respond(conn, &frame, events, app) {
        send::json(tx, &out.with_seq(app.next_seq())).await?;
    }
    Ok(())
}

/// Everything to write back for one inbound frame, in order.
///
/// Broadcasts already queued for this connection, including any the frame
/// itself just caused, go out ahead of the direct replies.
fn respond(
    conn: &mut Connection,
    frame: &InboundFrame,
    events: &mut EventReceiver,
    app: &AppState,
) -> Vec<EventFrame> {
    let replies = dispatch(conn, frame, app);
    if replies.is_empty() {
        return replies;
    }

    let mut out = Vec::with_capacity(replies.len());
    while let Ok(event) = events.try_recv() {
        out.push(outbound::broadcast_frame(&event));
    }
    out.extend(replies);
    out
}

/// Route by event name. Returns the direct replies for the requester only.
fn dispatch(conn: &mut Connection, frame: &InboundFrame, app: &AppState) -> Vec<EventFrame> {
    match frame.event.as_str() {
        DRIVER_START => {
            let Some(start) = frame.payload_as::<DriverStart>() else {
                debug!(conn_id = %conn.id(), "malformed driver:start payload");
                return vec![outbound::error_frame("invalid driver:start payload")];
            };
            match app.lifecycle.driver_start(conn, &start) {
                Ok(confirmed) => vec![outbound::confirmed_frame(&confirmed)],
                Err(e) => vec![outbound::error_frame(e.to_string())],
            }
        }
        DRIVER_LOCATION => {
            match frame.payload_as::<DriverLocation>() {
                Some(location) => {
                    app.lifecycle.driver_location(conn, &location);
                }
                None => debug!(conn_id = %conn.id(), "malformed location update dropped"),
            }
            Vec::new()
        }
        STUDENT_GET_ACTIVE_BUSES => app
            .lifecycle
            .active_buses(conn)
            .iter()
            .flat_map(|(activated, position)| {
                [
                    outbound::broadcast_frame(activated),
                    outbound::broadcast_frame(position),
                ]
            })
            .collect(),
        other => {
            debug!(conn_id = %conn.id(), event = other, "unknown event ignored");
            Vec::new()
        }
    }
}
