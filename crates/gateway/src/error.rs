//! Gateway error types.

use thiserror::Error;

/// Errors surfaced by the remote data gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The requested record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A write conflicted with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend rejected or failed the request.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Convenience alias for gateway results.
pub type Result<T> = std::result::Result<T, GatewayError>;
