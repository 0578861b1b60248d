use std::sync::Arc;

use bustrack_core::{ConnId, PublisherId};
use bustrack_protocol::events::{DriverConfirmed, DriverLocation, DriverStart};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::hub::{BroadcastHub, EventReceiver};
use crate::manager::SessionManager;
use crate::snapshot::{SnapshotPair, SnapshotProvider};
use crate::types::PositionReading;

/// Per-connection state.
///
/// Every connection starts as an anonymous subscriber. Sending
/// `driver:start` makes it a publisher: `Unauthenticated` after a refused
/// attempt, `Active` once a session is open. Closing is modelled by
/// [`ConnectionLifecycleController::disconnect`] consuming the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnState {
    Connected,
    Unauthenticated,
    Active { publisher_id: PublisherId },
}

/// A live transport connection as seen by the core.
#[derive(Debug)]
pub struct Connection {
    id: ConnId,
    state: ConnState,
}

impl Connection {
    pub fn id(&self) -> &ConnId {
        &self.id
    }

    pub fn state(&self) -> &ConnState {
        &self.state
    }
}

/// Binds transport connect/disconnect signals to the session table and the
/// broadcast hub, and owns the cleanup guarantees:
///
/// - a publisher disconnect produces exactly one deactivation;
/// - a connection whose session was taken over produces none;
/// - subscribers leave no trace beyond hub registration.
pub struct ConnectionLifecycleController {
    sessions: Arc<SessionManager>,
    hub: Arc<BroadcastHub>,
    snapshots: SnapshotProvider,
}

impl ConnectionLifecycleController {
    pub fn new(sessions: Arc<SessionManager>, hub: Arc<BroadcastHub>) -> Self {
        Self {
            snapshots: SnapshotProvider::new(Arc::clone(&sessions)),
            sessions,
            hub,
        }
    }

    /// Register a new transport connection. The receiver carries every
    /// broadcast event for it and must be drained by the transport.
    pub fn connect(&self) -> (Connection, EventReceiver) {
        let id = ConnId::new();
        let events = self.hub.register_connection(&id);
        info!(conn_id = %id, "connection opened");
        (
            Connection {
                id,
                state: ConnState::Connected,
            },
            events,
        )
    }

    /// Handle `driver:start`. The result is for this connection only.
    pub fn driver_start(
        &self,
        conn: &mut Connection,
        start: &DriverStart,
    ) -> Result<DriverConfirmed, AuthError> {
        match self.sessions.start_session(&start.bus_id, &start.token, &conn.id) {
            Ok(session) => {
                let previous = std::mem::replace(
                    &mut conn.state,
                    ConnState::Active {
                        publisher_id: session.publisher_id.clone(),
                    },
                );
                // a connection speaks for at most one bus
                if let ConnState::Active { publisher_id } = previous {
                    if publisher_id != session.publisher_id {
                        self.sessions.end_session(publisher_id.as_str(), &conn.id);
                    }
                }
                let name = self
                    .sessions
                    .registry()
                    .get(session.publisher_id.as_str())
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                Ok(DriverConfirmed {
                    bus_id: session.publisher_id.to_string(),
                    name,
                })
            }
            Err(e) => {
                warn!(conn_id = %conn.id, bus_id = %start.bus_id, code = e.code(), "driver authentication failed");
                // an already active publisher keeps its session
                if !matches!(conn.state, ConnState::Active { .. }) {
                    conn.state = ConnState::Unauthenticated;
                }
                Err(e)
            }
        }
    }

    /// Handle `driver:location`. Never produces a reply, accepted or not.
    pub fn driver_location(&self, conn: &Connection, location: &DriverLocation) -> bool {
        let reading = PositionReading {
            latitude: location.lat,
            longitude: location.lng,
            speed: location.speed,
            heading: location.heading,
            accuracy: location.accuracy,
        };
        self.sessions
            .update_position(&location.bus_id, &location.token, &conn.id, &reading)
    }

    /// Handle `student:getActiveBuses`: the snapshot, for the requester only.
    pub fn active_buses(&self, conn: &Connection) -> Vec<SnapshotPair> {
        let snapshot = self.snapshots.snapshot();
        debug!(conn_id = %conn.id, buses = snapshot.len(), "snapshot requested");
        snapshot
    }

    /// Transport closed. Runs once per connection.
    pub fn disconnect(&self, conn: Connection) {
        self.hub.deregister_connection(&conn.id);
        if let ConnState::Active { publisher_id } = &conn.state {
            if self.sessions.end_session(publisher_id.as_str(), &conn.id) {
                info!(conn_id = %conn.id, bus_id = %publisher_id, "driver disconnected");
            } else {
                debug!(conn_id = %conn.id, bus_id = %publisher_id, "orphaned driver connection closed");
            }
        }
        info!(conn_id = %conn.id, "connection closed");
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }
}
