pub mod buses;
pub mod health;
pub mod verify;
