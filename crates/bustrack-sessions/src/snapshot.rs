use std::sync::Arc;

use crate::manager::SessionManager;
use crate::types::BroadcastEvent;

/// `(PublisherActivated, PositionUpdated)` for one bus with a known fix.
pub type SnapshotPair = (BroadcastEvent, BroadcastEvent);

/// Replays current state to a single late-joining subscriber.
///
/// Only sessions that have produced at least one accepted reading are
/// included. A bus that authenticated but has no fix yet stays invisible to
/// a late joiner until its next position update arrives.
#[derive(Clone)]
pub struct SnapshotProvider {
    sessions: Arc<SessionManager>,
}

impl SnapshotProvider {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    pub fn snapshot(&self) -> Vec<SnapshotPair> {
        let registry = self.sessions.registry();
        self.sessions
            .sessions()
            .into_iter()
            .filter_map(|session| {
                let position = session.position.as_ref()?;
                let profile = registry.get(session.publisher_id.as_str())?;
                let activated = BroadcastEvent::PublisherActivated {
                    id: profile.id.clone(),
                    name: profile.name.clone(),
                    route: profile.route.clone(),
                    color: profile.color.clone(),
                };
                let updated = BroadcastEvent::position_updated(&session.publisher_id, position);
                Some((activated, updated))
            })
            .collect()
    }
}
