// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LikeRelay` Transports
//!
//! Concrete network transports for the `LikeRelay` dispatch pipeline.
//!
//! | Transport | Strategy | Id | Priority |
//! |-----------|----------|----|----------|
//! | Pass-through relay | [`ProxiedStrategy`] | `relay` | 100 |
//! | Out-of-band callback | [`CallbackChannelStrategy`] | `callback` | 80 |
//! | Direct endpoint call | [`DirectStrategy`] | `direct` | 60 |
//!
//! The local simulation (priority 0) lives in `likerelay-fetch` and closes
//! every default chain.
//!
//! ## Usage
//!
//! ```ignore
//! use likerelay_transports::DispatchPlan;
//! use likerelay_fetch::DispatchContext;
//!
//! let dispatcher = DispatchPlan::new()
//!     .probe_metadata(false)
//!     .build(Arc::new(DispatchContext::new()), history);
//!
//! let result = dispatcher.dispatch("12345678", 100).await?;
//! ```

pub mod callback;
pub mod direct;
pub mod metadata;
pub mod plan;
pub mod proxied;

// Re-export key types
pub use callback::{CallbackChannelStrategy, CALLBACK_ID};
pub use direct::{DirectStrategy, DIRECT_ID};
pub use metadata::{ActionMetadataLookup, EndpointMetadataLookup};
pub use plan::{default_dispatcher, DispatchPlan};
pub use proxied::{ProxiedStrategy, PROXIED_ID};
