//! Core error types for `LikeRelay`.

use thiserror::Error;

/// Rejection of caller-supplied input.
///
/// This is the only error a caller of the dispatcher can observe. It is
/// raised before any network activity takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Player id is not purely numeric or lies outside the accepted range.
    #[error("Invalid player id {0:?}: must be numeric between 10000001 and 99999999999")]
    InvalidPlayerId(String),

    /// Quantity lies outside the accepted range.
    #[error("Invalid quantity {0}: must be between 1 and 1000")]
    InvalidQuantity(i64),
}

/// Failure reported by a history sink.
///
/// The dispatcher logs these and never surfaces them.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be reached or written.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
