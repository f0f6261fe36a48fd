//! Domain errors for the MetaArmy intent pipeline.

use thiserror::Error;

/// Domain-level errors that can occur in MetaArmy.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("No pending intent to act on")]
    NoPendingIntent,

    #[error("No wallet connected")]
    WalletNotConnected,

    #[error("Swarm size {requested} exceeds the configured maximum of {max}")]
    SwarmTooLarge { requested: usize, max: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
