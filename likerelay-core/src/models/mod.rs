//! Domain models for LikeRelay.
//!
//! ## Submodules
//!
//! - [`request`] - Validated like request
//! - [`result`] - Normalized like result
//! - [`player`] - Player metadata and nickname rules
//! - [`history`] - History records handed to sinks

mod history;
mod player;
mod request;
mod result;

// Re-export everything at the models level
pub use history::HistoryRecord;
pub use player::{friendly_nickname, is_placeholder_nickname, placeholder_nickname, PlayerMetadata};
pub use request::LikeRequest;
pub use result::LikeResult;
