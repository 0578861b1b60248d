use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusTrackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event channel protocol error: {0}")]
    Protocol(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

impl BusTrackError {
    /// Short error code string, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            BusTrackError::Config(_) => "CONFIG_ERROR",
            BusTrackError::Protocol(_) => "PROTOCOL_ERROR",
            BusTrackError::Serialization(_) => "SERIALIZATION_ERROR",
            BusTrackError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
        }
    }
}

pub type Result<T> = std::result::Result<T, BusTrackError>;
