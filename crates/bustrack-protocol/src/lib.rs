//! bustrack-protocol: wire types for the real-time event channel and the
//! HTTP bootstrap API.

pub mod api;
pub mod events;
pub mod frames;
