//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] fetchgraph_proto::Error),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The data service answered with an error status.
    #[error("server error {code}: {message}")]
    Server { code: u32, message: String },

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
