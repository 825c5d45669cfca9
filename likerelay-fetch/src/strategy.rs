//! Delivery strategy trait and types.
//!
//! A strategy represents one transport path for the same logical action:
//! send `uid`, `quantity` and the shared credential to the remote endpoint
//! and parse a [`LikeResult`]. Strategies are tried in priority order by the
//! [`StrategyChain`](crate::chain::StrategyChain).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use likerelay_core::{LikeRequest, LikeResult};
use serde::{Deserialize, Serialize};

use crate::context::DispatchContext;
use crate::error::{DeliveryError, ErrorKind};

// ============================================================================
// Strategy Kind
// ============================================================================

/// The transport a strategy uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Through a public pass-through relay.
    Proxied,
    /// Result arrives through an out-of-band callback.
    CallbackChannel,
    /// Straight to the remote endpoint.
    Direct,
    /// Local synthesis, no network.
    Simulated,
}

impl StrategyKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Proxied => "Proxied",
            Self::CallbackChannel => "Callback Channel",
            Self::Direct => "Direct",
            Self::Simulated => "Simulated",
        }
    }

    /// Default priority for this kind (higher = tried first).
    pub fn default_priority(&self) -> u32 {
        match self {
            Self::Proxied => 100,
            Self::CallbackChannel => 80,
            Self::Direct => 60,
            Self::Simulated => 0,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Strategy Outcome
// ============================================================================

/// Result of one attempt, as a tagged value rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The attempt produced a complete result.
    Success(LikeResult),
    /// The attempt failed as a whole.
    Failure {
        /// Classification of the failure.
        kind: ErrorKind,
        /// Human-readable detail.
        detail: String,
    },
}

impl StrategyOutcome {
    /// Returns true for [`StrategyOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<Result<LikeResult, DeliveryError>> for StrategyOutcome {
    fn from(result: Result<LikeResult, DeliveryError>) -> Self {
        match result {
            Ok(result) => Self::Success(result),
            Err(error) => Self::Failure {
                kind: error.kind(),
                detail: error.to_string(),
            },
        }
    }
}

// ============================================================================
// Delivery Strategy Trait
// ============================================================================

/// One transport-specific way to deliver the like action.
///
/// ## Implementing a Strategy
///
/// ```ignore
/// struct LoopbackStrategy;
///
/// #[async_trait]
/// impl DeliveryStrategy for LoopbackStrategy {
///     fn id(&self) -> &str {
///         "loopback"
///     }
///
///     fn kind(&self) -> StrategyKind {
///         StrategyKind::Direct
///     }
///
///     async fn attempt(
///         &self,
///         ctx: &DispatchContext,
///         request: &LikeRequest,
///     ) -> Result<LikeResult, DeliveryError> {
///         let url = action_url(&ctx.settings, request, &[])?;
///         let response = ctx.http.get(&url, ctx.settings.direct_timeout).await?;
///         parse_like_payload(&response.text().await.map_err(HttpError::from)?)
///     }
/// }
/// ```
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    /// Unique identifier for this strategy (e.g., "relay.allorigins", "direct").
    fn id(&self) -> &str;

    /// The transport this strategy uses.
    fn kind(&self) -> StrategyKind;

    /// Human-readable name for this strategy.
    fn display_name(&self) -> String {
        format!("{} ({})", self.id(), self.kind().display_name())
    }

    /// Wall-clock bound for one attempt; `None` means unbounded.
    ///
    /// The chain abandons the attempt when this elapses and treats it as a
    /// timeout failure.
    fn timeout(&self, ctx: &DispatchContext) -> Option<Duration> {
        ctx.settings.timeout_for(self.kind())
    }

    /// Performs one attempt. No retries inside: the next strategy is the retry.
    async fn attempt(
        &self,
        ctx: &DispatchContext,
        request: &LikeRequest,
    ) -> Result<LikeResult, DeliveryError>;

    /// Priority of this strategy (higher = try first).
    fn priority(&self) -> u32 {
        self.kind().default_priority()
    }
}

// ============================================================================
// Strategy Info
// ============================================================================

/// Information about a strategy (for reporting).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy ID.
    pub id: String,
    /// Strategy kind.
    pub kind: StrategyKind,
    /// Priority.
    pub priority: u32,
    /// Attempt bound in milliseconds, if any.
    pub timeout_ms: Option<u64>,
}

impl StrategyInfo {
    /// Creates strategy info from a strategy implementation.
    pub fn from_strategy(strategy: &dyn DeliveryStrategy, ctx: &DispatchContext) -> Self {
        Self {
            id: strategy.id().to_string(),
            kind: strategy.kind(),
            priority: strategy.priority(),
            timeout_ms: strategy
                .timeout(ctx)
                .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
