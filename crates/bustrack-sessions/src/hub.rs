use std::sync::Arc;

use bustrack_core::ConnId;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::types::BroadcastEvent;

pub type EventReceiver = mpsc::Receiver<Arc<BroadcastEvent>>;

/// Fan-out events to every connected party, publisher or subscriber alike.
///
/// Each recipient gets its own bounded queue. Delivery is fire-and-forget:
/// when a recipient's queue is full the event is dropped for that recipient
/// only, and nobody is told.
pub struct BroadcastHub {
    recipients: DashMap<ConnId, mpsc::Sender<Arc<BroadcastEvent>>>,
    capacity: usize,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            recipients: DashMap::new(),
            // mpsc::channel panics on zero capacity
            capacity: capacity.max(1),
        }
    }

    /// Add a live recipient; the returned receiver is its outbound queue.
    /// Registering an id twice replaces the earlier queue.
    pub fn register_connection(&self, conn: &ConnId) -> EventReceiver {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.recipients.insert(conn.clone(), tx);
        debug!(conn_id = %conn, recipients = self.recipients.len(), "recipient registered");
        rx
    }

    /// Drop a recipient. Returns `false` if it was not registered.
    pub fn deregister_connection(&self, conn: &ConnId) -> bool {
        let removed = self.recipients.remove(conn).is_some();
        if removed {
            debug!(conn_id = %conn, recipients = self.recipients.len(), "recipient deregistered");
        }
        removed
    }

    /// Queue `event` for every registered recipient.
    /// Returns how many recipients it was queued for.
    pub fn publish(&self, event: BroadcastEvent) -> usize {
        let event = Arc::new(event);
        let mut queued = 0;
        for entry in self.recipients.iter() {
            match entry.value().try_send(Arc::clone(&event)) {
                Ok(()) => queued += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        conn_id = %entry.key(),
                        bus_id = %event.publisher_id(),
                        "recipient queue full, event dropped"
                    );
                }
                // receiver gone; the lifecycle will deregister it
                Err(TrySendError::Closed(_)) => {}
            }
        }
        queued
    }

    pub fn recipient_count(&self) -> usize {
        self.recipients.len()
    }
}
