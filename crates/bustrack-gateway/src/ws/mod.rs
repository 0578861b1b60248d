pub mod connection;
pub mod message;
pub mod outbound;
pub mod send;
