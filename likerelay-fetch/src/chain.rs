//! Fallback chain for executing delivery strategies in order.
//!
//! The chain takes a list of delivery strategies and executes them strictly
//! one after another, in priority order, until one succeeds. Every attempt is
//! bounded by its strategy's timeout; an attempt that overruns is dropped
//! (releasing whatever it holds) and counted as a timeout failure.

use std::time::{Duration, Instant};

use likerelay_core::{LikeRequest, LikeResult};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::context::DispatchContext;
use crate::error::{DeliveryError, ErrorKind};
use crate::strategy::{DeliveryStrategy, StrategyInfo, StrategyKind, StrategyOutcome};

// ============================================================================
// Delivery Attempt
// ============================================================================

/// Record of a single delivery attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryAttempt {
    /// The strategy ID that was attempted.
    pub strategy_id: String,
    /// The transport used.
    pub kind: StrategyKind,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Failure classification, if the attempt failed.
    pub failure: Option<ErrorKind>,
    /// Error detail, if the attempt failed.
    pub error: Option<String>,
    /// How long the attempt took.
    pub duration: Duration,
}

impl DeliveryAttempt {
    /// Creates a successful attempt record.
    pub fn success(strategy_id: impl Into<String>, kind: StrategyKind, duration: Duration) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            kind,
            success: true,
            failure: None,
            error: None,
            duration,
        }
    }

    /// Creates a failed attempt record.
    pub fn failure(
        strategy_id: impl Into<String>,
        kind: StrategyKind,
        failure: ErrorKind,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            kind,
            success: false,
            failure: Some(failure),
            error: Some(error.into()),
            duration,
        }
    }
}

// ============================================================================
// Chain Outcome
// ============================================================================

/// The winning attempt's result.
#[derive(Debug, Clone)]
pub struct Delivered {
    /// The parsed or synthesized result.
    pub result: LikeResult,
    /// The strategy that succeeded.
    pub strategy_id: String,
    /// The transport used.
    pub kind: StrategyKind,
}

/// The outcome of one chain execution.
#[derive(Debug)]
pub struct ChainOutcome {
    /// The winning result, or `None` if every strategy failed.
    pub delivered: Option<Delivered>,
    /// All attempts made, in order.
    pub attempts: Vec<DeliveryAttempt>,
    /// Total duration of all attempts.
    pub duration: Duration,
}

impl ChainOutcome {
    /// Returns true if some strategy succeeded.
    pub fn is_success(&self) -> bool {
        self.delivered.is_some()
    }

    /// Returns the number of strategies that were tried.
    pub fn attempts_count(&self) -> usize {
        self.attempts.len()
    }

    /// Returns the successful strategy ID, if any.
    pub fn successful_strategy(&self) -> Option<&str> {
        self.delivered.as_ref().map(|d| d.strategy_id.as_str())
    }

    /// Returns all errors that occurred.
    pub fn errors(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_deref())
            .collect()
    }
}

// ============================================================================
// Strategy Chain
// ============================================================================

/// An ordered chain of delivery strategies.
///
/// Strategies are sorted by priority once, at construction; the sort is
/// stable so equal priorities keep insertion order.
pub struct StrategyChain {
    strategies: Vec<Box<dyn DeliveryStrategy>>,
}

impl StrategyChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Creates a chain with the given strategies.
    pub fn with_strategies(strategies: Vec<Box<dyn DeliveryStrategy>>) -> Self {
        let mut chain = Self { strategies };
        chain.sort_by_priority();
        chain
    }

    /// Adds a strategy to the chain.
    pub fn add_strategy(&mut self, strategy: Box<dyn DeliveryStrategy>) {
        self.strategies.push(strategy);
        self.sort_by_priority();
    }

    /// Sorts strategies by priority (highest first).
    fn sort_by_priority(&mut self) {
        self.strategies
            .sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    /// Returns the number of strategies in the chain.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Returns true if the chain ends with a strategy that cannot fail.
    pub fn has_terminal(&self) -> bool {
        self.strategies
            .last()
            .is_some_and(|s| s.kind() == StrategyKind::Simulated)
    }

    /// Returns information about all strategies, in execution order.
    pub fn strategy_info(&self, ctx: &DispatchContext) -> Vec<StrategyInfo> {
        self.strategies
            .iter()
            .map(|s| StrategyInfo::from_strategy(s.as_ref(), ctx))
            .collect()
    }

    /// Execute the chain, trying strategies in order until one succeeds.
    #[instrument(skip(self, ctx, request), fields(strategies = self.strategies.len(), uid = %request.player_id()))]
    pub async fn execute(&self, ctx: &DispatchContext, request: &LikeRequest) -> ChainOutcome {
        let start = Instant::now();
        let mut attempts = Vec::with_capacity(self.strategies.len());

        info!(count = self.strategies.len(), "Executing delivery chain");

        for strategy in &self.strategies {
            let strategy_id = strategy.id();
            let kind = strategy.kind();

            let attempt_start = Instant::now();
            debug!(strategy = %strategy_id, kind = %kind, "Attempting delivery");

            match bounded_attempt(strategy.as_ref(), ctx, request).await {
                StrategyOutcome::Success(result) => {
                    let duration = attempt_start.elapsed();
                    info!(
                        strategy = %strategy_id,
                        duration = ?duration,
                        "Strategy succeeded"
                    );

                    attempts.push(DeliveryAttempt::success(strategy_id, kind, duration));

                    return ChainOutcome {
                        delivered: Some(Delivered {
                            result,
                            strategy_id: strategy_id.to_string(),
                            kind,
                        }),
                        attempts,
                        duration: start.elapsed(),
                    };
                }
                StrategyOutcome::Failure {
                    kind: failure,
                    detail,
                } => {
                    let duration = attempt_start.elapsed();
                    warn!(
                        strategy = %strategy_id,
                        failure = %failure,
                        error = %detail,
                        duration = ?duration,
                        "Strategy failed"
                    );

                    attempts.push(DeliveryAttempt::failure(
                        strategy_id,
                        kind,
                        failure,
                        detail,
                        duration,
                    ));
                }
            }
        }

        warn!("All strategies failed");
        ChainOutcome {
            delivered: None,
            attempts,
            duration: start.elapsed(),
        }
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one attempt under its strategy's timeout.
///
/// On timeout the attempt future is dropped, which releases any callback
/// registration or in-flight request it owns.
async fn bounded_attempt(
    strategy: &dyn DeliveryStrategy,
    ctx: &DispatchContext,
    request: &LikeRequest,
) -> StrategyOutcome {
    let result = match strategy.timeout(ctx) {
        Some(limit) => match tokio::time::timeout(limit, strategy.attempt(ctx, request)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(limit)),
        },
        None => strategy.attempt(ctx, request).await,
    };
    StrategyOutcome::from(result)
}

// ============================================================================
// Tests
// ============================================================================
