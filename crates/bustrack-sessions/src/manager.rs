use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bustrack_core::{ConnId, PublisherId};
use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::auth::TokenAuthenticator;
use crate::error::AuthError;
use crate::hub::BroadcastHub;
use crate::registry::PublisherRegistry;
use crate::types::{BroadcastEvent, PositionReading, PublisherSession};

type SessionTable = BTreeMap<PublisherId, PublisherSession>;

/// Sole owner of the active-session table: at most one session per bus.
///
/// Every mutation publishes its event while the table lock is still held,
/// so the broadcast order is exactly the order handlers ran in. Nothing
/// under the lock blocks: publishing only enqueues.
pub struct SessionManager {
    auth: TokenAuthenticator,
    hub: Arc<BroadcastHub>,
    sessions: Mutex<SessionTable>,
}

impl SessionManager {
    pub fn new(registry: Arc<PublisherRegistry>, hub: Arc<BroadcastHub>) -> Self {
        Self {
            auth: TokenAuthenticator::new(registry),
            hub,
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    /// Authenticate and open a session bound to `conn`.
    ///
    /// Any existing session for the same bus is replaced wholesale. The
    /// displaced connection is not notified; it simply no longer owns the
    /// session, so its eventual disconnect is a no-op.
    #[instrument(skip(self, token), fields(conn_id = %conn))]
    pub fn start_session(
        &self,
        publisher_id: &str,
        token: &str,
        conn: &ConnId,
    ) -> Result<PublisherSession, AuthError> {
        let profile = self.auth.verify(publisher_id, token)?;
        let session = PublisherSession::new(profile.id.clone(), conn.clone());

        let mut table = self.table();
        let displaced = table.insert(profile.id.clone(), session.clone());
        self.hub.publish(BroadcastEvent::PublisherActivated {
            id: profile.id.clone(),
            name: profile.name.clone(),
            route: profile.route.clone(),
            color: profile.color.clone(),
        });
        drop(table);

        match displaced {
            Some(old) if old.conn != *conn => {
                info!(bus_id = %profile.id, orphaned_conn = %old.conn, "publisher session replaced");
            }
            _ => info!(bus_id = %profile.id, "publisher session started"),
        }
        Ok(session)
    }

    /// Apply a position reading. Returns whether it was accepted.
    ///
    /// The token is re-checked on every reading. Rejections are never
    /// reported to the sender, so this cannot be used to probe for valid
    /// tokens.
    #[instrument(skip(self, token, reading), fields(conn_id = %conn))]
    pub fn update_position(
        &self,
        publisher_id: &str,
        token: &str,
        conn: &ConnId,
        reading: &PositionReading,
    ) -> bool {
        let profile = match self.auth.verify(publisher_id, token) {
            Ok(p) => p,
            Err(e) => {
                debug!(reason = e.code(), "location update dropped");
                return false;
            }
        };
        let Some(position) = reading.normalize() else {
            debug!(bus_id = %profile.id, "malformed location update dropped");
            return false;
        };

        let mut table = self.table();
        let Some(session) = table.get_mut(&profile.id) else {
            debug!(bus_id = %profile.id, "location update without a session dropped");
            return false;
        };
        if session.conn != *conn {
            debug!(bus_id = %profile.id, "location update from a non-owning connection dropped");
            return false;
        }

        let event = BroadcastEvent::position_updated(&profile.id, &position);
        session.position = Some(position);
        session.last_update = Some(Utc::now());
        self.hub.publish(event);
        true
    }

    /// Close the session for `publisher_id` if `conn` still owns it.
    ///
    /// Returns whether a session was removed (and a deactivation sent).
    /// Calling this for a replaced or already-closed session does nothing.
    #[instrument(skip(self), fields(conn_id = %conn))]
    pub fn end_session(&self, publisher_id: &str, conn: &ConnId) -> bool {
        let mut table = self.table();
        let owned = table
            .get(publisher_id)
            .is_some_and(|session| session.conn == *conn);
        if !owned {
            debug!(bus_id = publisher_id, "no owned session to end");
            return false;
        }
        if let Some(session) = table.remove(publisher_id) {
            self.hub.publish(BroadcastEvent::PublisherDeactivated {
                id: session.publisher_id,
            });
        }
        drop(table);

        info!(bus_id = publisher_id, "publisher session ended");
        true
    }

    pub fn is_active(&self, publisher_id: &str) -> bool {
        self.table().contains_key(publisher_id)
    }

    pub fn active_count(&self) -> usize {
        self.table().len()
    }

    /// Point-in-time copy of every live session, in bus id order.
    pub fn sessions(&self) -> Vec<PublisherSession> {
        self.table().values().cloned().collect()
    }

    pub fn authenticator(&self) -> &TokenAuthenticator {
        &self.auth
    }

    pub fn registry(&self) -> &Arc<PublisherRegistry> {
        self.auth.registry()
    }

    fn table(&self) -> MutexGuard<'_, SessionTable> {
        // the table holds plain data, so a panicked holder cannot leave it
        // half-updated in a way later readers would trip over
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
