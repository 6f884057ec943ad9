//! Protocol error types.

use thiserror::Error;

/// Protocol-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Payload exceeds the configured size limit.
    #[error("message too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
