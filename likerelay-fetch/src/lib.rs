// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LikeRelay` Fetch
//!
//! Delivery strategies, fallback chain, and dispatcher for `LikeRelay`.
//!
//! ## Host APIs
//!
//! The [`host`] module provides the pieces strategies share:
//!
//! - [`host::http`] - HTTP client with tracing and credential redaction
//! - [`host::callback`] - Correlation registry for out-of-band callbacks
//!
//! ## Dispatch Pipeline
//!
//! - [`strategy::DeliveryStrategy`] - Trait for transport implementations
//! - [`chain::StrategyChain`] - Executes strategies in priority order
//! - [`dispatcher::Dispatcher`] - Validation, fallback, enrichment, history
//! - [`context::DispatchContext`] - Provides access to host APIs and settings
//!
//! ## Example
//!
//! ```ignore
//! use likerelay_fetch::{DispatchContext, Dispatcher, StrategyChain};
//!
//! let chain = StrategyChain::with_strategies(vec![
//!     Box::new(RelayStrategy::new()),
//!     Box::new(SimulatedStrategy::new()),
//! ]);
//! let dispatcher = Dispatcher::new(Arc::new(DispatchContext::new()), chain, history);
//!
//! let result = dispatcher.dispatch("12345678", 100).await?;
//! ```

// Core modules
pub mod chain;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod metadata;
pub mod parser;
pub mod query;
pub mod simulated;
pub mod strategy;

// Re-export key types at crate root

// Errors
pub use error::{DeliveryError, ErrorKind, HttpError};

// Host APIs
pub use host::{
    callback::{CallbackRegistration, CorrelationRegistry},
    http::HttpClient,
};

// Strategy & Chain
pub use chain::{ChainOutcome, Delivered, DeliveryAttempt, StrategyChain};
pub use context::{
    DispatchContext, DispatchContextBuilder, DispatchSettings, RelayEnvelope, SimulationRange,
    DEFAULT_ENDPOINT_URL, DEFAULT_RELAY_URL,
};
pub use strategy::{DeliveryStrategy, StrategyInfo, StrategyKind, StrategyOutcome};

// Dispatcher
pub use dispatcher::{DispatchReport, Dispatcher, FALLBACK_ID};
pub use metadata::{MetadataLookup, NoMetadataLookup};
pub use simulated::{SimulatedStrategy, SIMULATED_ID};

// Payload helpers
pub use parser::{extract_envelope, parse_like_payload, split_callback};
pub use query::{action_url, cache_buster};
