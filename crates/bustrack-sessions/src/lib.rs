//! bustrack-sessions: the presence core.
//!
//! Publishers (bus drivers) authenticate with a per-bus secret and stream
//! position readings; every connected party receives the resulting
//! activation, position and deactivation events through a flat fan-out.
//!
//! - [`registry::PublisherRegistry`]: immutable fleet table built at startup
//! - [`auth::TokenAuthenticator`]: constant-time secret checks
//! - [`manager::SessionManager`]: the single owner of the live-session table
//! - [`hub::BroadcastHub`]: bounded per-connection fan-out queues
//! - [`snapshot::SnapshotProvider`]: replay for late-joining subscribers
//! - [`lifecycle::ConnectionLifecycleController`]: binds transport
//!   connect/disconnect to the above
//!
//! Nothing here performs I/O; the gateway pumps sockets into it.

pub mod auth;
pub mod error;
pub mod hub;
pub mod lifecycle;
pub mod manager;
pub mod registry;
pub mod snapshot;
pub mod types;

pub use auth::TokenAuthenticator;
pub use error::{AuthError, RegistryError};
pub use hub::BroadcastHub;
pub use lifecycle::{ConnState, Connection, ConnectionLifecycleController};
pub use manager::SessionManager;
pub use registry::{PublisherProfile, PublisherRegistry};
pub use snapshot::{SnapshotPair, SnapshotProvider};
pub use types::{BroadcastEvent, Position, PositionReading, PublisherSession};
