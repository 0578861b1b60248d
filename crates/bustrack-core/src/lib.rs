//! bustrack-core: configuration, shared identifiers and the top-level error
//! type used by every other bustrack crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::BusTrackConfig;
pub use error::{BusTrackError, Result};
pub use types::{ConnId, PublisherId};
