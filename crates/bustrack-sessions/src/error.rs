use thiserror::Error;

/// Why a presented credential was refused.
///
/// Only ever reported to the connection that presented it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The claimed bus ID is not in the registry.
    #[error("unknown bus ID: {id}")]
    UnknownPublisher { id: String },

    /// The secret does not belong to the claimed (or any) bus.
    #[error("invalid token")]
    InvalidToken,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UnknownPublisher { .. } => "UNKNOWN_PUBLISHER",
            AuthError::InvalidToken => "INVALID_TOKEN",
        }
    }
}

/// Startup validation failures for the publisher table.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no publishers configured")]
    Empty,

    #[error("publisher entry has an empty id")]
    EmptyId,

    #[error("duplicate publisher id: {id}")]
    DuplicateId { id: String },

    /// Two buses sharing a secret would make token-only login ambiguous.
    #[error("publisher {id} reuses another publisher's token")]
    DuplicateToken { id: String },

    #[error("publisher {id} has an empty token")]
    EmptyToken { id: String },
}
