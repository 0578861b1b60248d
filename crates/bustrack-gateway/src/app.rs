use axum::{
    routing::{get, post},
    Router,
};
use bustrack_core::config::BusTrackConfig;
use bustrack_sessions::{
    BroadcastHub, ConnectionLifecycleController, PublisherRegistry, RegistryError, SessionManager,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: BusTrackConfig,
    pub event_seq: AtomicU64,
    pub lifecycle: ConnectionLifecycleController,
}

impl AppState {
    /// Wire the presence core together from configuration.
    pub fn new(config: BusTrackConfig) -> Result<Self, RegistryError> {
        let registry = Arc::new(PublisherRegistry::from_config(&config.publishers)?);
        let hub = Arc::new(BroadcastHub::new(config.broadcast.queue_capacity));
        let sessions = Arc::new(SessionManager::new(registry, Arc::clone(&hub)));
        Ok(Self {
            config,
            event_seq: AtomicU64::new(0),
            lifecycle: ConnectionLifecycleController::new(sessions, hub),
        })
    }

    /// Monotonically increasing sequence for outbound event frames.
    pub fn next_seq(&self) -> u64 {
        self.event_seq.fetch_add(1, Ordering::Relaxed)
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/api/buses", get(crate::http::buses::buses_handler))
        .route(
            "/api/verify-token",
            post(crate::http::verify::verify_token_handler),
        )
        .route("/ws", get(crate::ws::connection::ws_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
