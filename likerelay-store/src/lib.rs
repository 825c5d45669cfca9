// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LikeRelay` Store
//!
//! Configuration and history persistence for `LikeRelay`.
//!
//! This crate provides:
//!
//! - **Config**: JSON config file converted into dispatch settings
//! - **History sinks**: in-memory and JSON-file [`HistorySink`] implementations
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use likerelay_store::{Config, JsonFileHistory};
//!
//! let config = Config::load().await?.with_env_overrides();
//! let history = JsonFileHistory::new(config.history_path(), config.history.limit);
//!
//! let stats = history.stats().await;
//! println!("{} likes sent", stats.total_likes);
//! ```
//!
//! [`HistorySink`]: likerelay_core::HistorySink

pub mod config;
pub mod error;
pub mod history;
pub mod persistence;

pub use config::{Config, HistoryConfig, TimeoutConfig, CREDENTIAL_ENV};
pub use error::StoreError;
pub use history::{HistoryStats, JsonFileHistory, MemoryHistory, DEFAULT_HISTORY_LIMIT};
pub use persistence::{
    default_config_dir, default_config_path, default_data_dir, default_history_path, ensure_dir,
    load_json, load_json_or_default, save_json,
};
