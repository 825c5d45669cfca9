//! Delivery error types.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Kind
// ============================================================================

/// Coarse classification of a failed delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport unreachable or non-success status.
    Network,
    /// Bounded wait exceeded.
    Timeout,
    /// Payload did not have the expected shape.
    InvalidResponse,
}

impl ErrorKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::InvalidResponse => "invalid response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Delivery Error
// ============================================================================

/// Error type for one delivery attempt.
///
/// Never leaves the dispatcher: the fallback chain turns every variant into
/// "try the next strategy".
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Remote answered with a non-success status.
    #[error("HTTP {status} from {target}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Which hop answered (endpoint, relay, callback channel).
        target: String,
    },

    /// Bounded wait exceeded.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Payload did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeliveryError {
    /// Classifies this error into one of the three delivery failure kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Status { .. } => ErrorKind::Network,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::InvalidResponse(_) | Self::Json(_) => ErrorKind::InvalidResponse,
            Self::Http(HttpError::Timeout) => ErrorKind::Timeout,
            Self::Http(HttpError::Request(e)) if e.is_timeout() => ErrorKind::Timeout,
            Self::Http(HttpError::InvalidUrl(_)) => ErrorKind::InvalidResponse,
            Self::Http(_) => ErrorKind::Network,
        }
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error, stored without its URL.
    #[error("Request error: {0}")]
    Request(reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for HttpError {
    /// Drops the request URL: it carries the shared credential.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err.without_url())
        }
    }
}
