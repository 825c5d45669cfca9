//! Host APIs for LikeRelay delivery strategies.
//!
//! - [`http`] - HTTP client with tracing and credential redaction
//! - [`callback`] - Correlation registry for out-of-band callbacks

pub mod callback;
pub mod http;

// Re-export key types
pub use callback::{CallbackRegistration, CorrelationRegistry};
pub use http::HttpClient;
