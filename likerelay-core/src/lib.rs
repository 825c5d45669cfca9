// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LikeRelay` Core
//!
//! Core types, validation, and traits for the `LikeRelay` dispatch pipeline.
//!
//! This crate provides the foundational abstractions used across all other
//! `LikeRelay` crates, including:
//!
//! - Domain models (requests, results, player metadata, history records)
//! - Input validation for player ids and quantities
//! - Error types
//! - The [`HistorySink`] boundary for best-effort persistence
//!
//! ## Key Types
//!
//! - [`LikeRequest`] - Validated, immutable request to send likes
//! - [`LikeResult`] - Normalized result of one dispatch
//! - [`PlayerMetadata`] - Optional nickname/region enrichment
//! - [`HistoryRecord`] - Durable record of one completed dispatch

pub mod error;
pub mod models;
pub mod traits;
pub mod validation;

// Re-export error types
pub use error::{StorageError, ValidationError};

// Re-export all model types
pub use models::{
    friendly_nickname, is_placeholder_nickname, placeholder_nickname, HistoryRecord, LikeRequest,
    LikeResult, PlayerMetadata,
};

// Re-export traits
pub use traits::HistorySink;

// Re-export validation predicates
pub use validation::{
    validate_player_id, validate_quantity, MAX_PLAYER_ID, MAX_QUANTITY, MIN_PLAYER_ID,
    MIN_QUANTITY,
};
