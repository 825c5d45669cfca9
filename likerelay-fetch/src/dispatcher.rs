//! Fallback orchestrator.
//!
//! The dispatcher is the single entry point for a like request. It validates
//! input, runs the strategy chain, enriches the winning result with player
//! metadata, and hands a history record to the configured sink without
//! waiting on it. Apart from validation it never fails: when every strategy
//! is exhausted it synthesizes a result locally.
//!
//! Side-effect-free metadata lookups run concurrently with delivery. A lookup
//! that may itself trigger the like action only runs after a real delivery,
//! and only when the delivered nickname is still a placeholder.

use std::sync::Arc;
use std::time::Duration;

use likerelay_core::{
    HistoryRecord, HistorySink, LikeRequest, LikeResult, PlayerMetadata, ValidationError,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::chain::{DeliveryAttempt, StrategyChain};
use crate::context::DispatchContext;
use crate::metadata::{MetadataLookup, NoMetadataLookup};
use crate::simulated::SimulatedStrategy;
use crate::strategy::StrategyKind;

/// Strategy id reported when the chain is exhausted and the dispatcher
/// synthesizes the result itself.
pub const FALLBACK_ID: &str = "simulated.fallback";

// ============================================================================
// Dispatch Report
// ============================================================================

/// Everything one dispatch produced.
#[derive(Debug)]
pub struct DispatchReport {
    /// Final, enriched result.
    pub result: LikeResult,
    /// History record handed to the sink.
    pub record: HistoryRecord,
    /// Every strategy attempt, in order.
    pub attempts: Vec<DeliveryAttempt>,
    /// Strategy that produced the result.
    pub strategy_id: String,
    /// Whether genuine metadata arrived in time.
    pub metadata_resolved: bool,
    /// Handle of the detached persistence task.
    ///
    /// Dropping it does not cancel persistence. Short-lived processes may
    /// await it before exiting.
    pub persistence: JoinHandle<()>,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Orchestrates one like request end to end.
pub struct Dispatcher {
    ctx: Arc<DispatchContext>,
    chain: StrategyChain,
    metadata: Arc<dyn MetadataLookup>,
    action_lookup: Option<Arc<dyn MetadataLookup>>,
    history: Arc<dyn HistorySink>,
}

impl Dispatcher {
    /// Creates a dispatcher without metadata lookup.
    pub fn new(
        ctx: Arc<DispatchContext>,
        chain: StrategyChain,
        history: Arc<dyn HistorySink>,
    ) -> Self {
        if !chain.has_terminal() {
            debug!("Chain has no terminal strategy, dispatcher will synthesize on exhaustion");
        }
        Self {
            ctx,
            chain,
            metadata: Arc::new(NoMetadataLookup),
            action_lookup: None,
            history,
        }
    }

    /// Sets the concurrent metadata lookup.
    ///
    /// A lookup that may consume the action is installed with
    /// [`Dispatcher::with_action_lookup`] instead.
    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataLookup>) -> Self {
        if metadata.may_consume_action() {
            return self.with_action_lookup(metadata);
        }
        self.metadata = metadata;
        self
    }

    /// Sets the lookup that may trigger the remote action.
    ///
    /// It runs only after a non-simulated delivery whose nickname is still a
    /// placeholder once the concurrent lookup has had its chance.
    pub fn with_action_lookup(mut self, lookup: Arc<dyn MetadataLookup>) -> Self {
        debug!(lookup = lookup.name(), "Metadata lookup may trigger the remote action");
        self.action_lookup = Some(lookup);
        self
    }

    /// Returns the dispatch context.
    pub fn context(&self) -> &DispatchContext {
        &self.ctx
    }

    /// Returns the strategy chain.
    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    /// Validates raw input and dispatches it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the player id or quantity is out of
    /// range. No strategy runs in that case.
    pub async fn dispatch(&self, player_id: &str, quantity: i64) -> Result<LikeResult, ValidationError> {
        let request = LikeRequest::new(player_id, quantity)?;
        Ok(self.dispatch_request(&request).await)
    }

    /// Dispatches an already validated request.
    pub async fn dispatch_request(&self, request: &LikeRequest) -> LikeResult {
        self.dispatch_with_report(request).await.result
    }

    /// Dispatches a request and returns the full report.
    #[instrument(skip(self, request), fields(uid = %request.player_id(), quantity = request.quantity()))]
    pub async fn dispatch_with_report(&self, request: &LikeRequest) -> DispatchReport {
        let lookup = self.spawn_metadata_lookup(request.player_id());

        let outcome = self.chain.execute(&self.ctx, request).await;
        let mut attempts = outcome.attempts;

        let (mut result, strategy_id, delivered_kind) = match outcome.delivered {
            Some(delivered) => (delivered.result, delivered.strategy_id, delivered.kind),
            None => {
                warn!(
                    attempts = attempts.len(),
                    "Delivery chain exhausted, synthesizing result"
                );
                let result = SimulatedStrategy::simulate(
                    request,
                    &self.ctx.settings.simulation,
                    &self.ctx.settings.default_region,
                );
                attempts.push(DeliveryAttempt::success(
                    FALLBACK_ID,
                    StrategyKind::Simulated,
                    Duration::ZERO,
                ));
                (result, FALLBACK_ID.to_string(), StrategyKind::Simulated)
            }
        };

        let mut metadata = self.await_metadata(lookup).await;
        if !metadata.as_ref().is_some_and(PlayerMetadata::is_genuine)
            && delivered_kind != StrategyKind::Simulated
            && result.has_placeholder_nickname()
        {
            metadata = self.run_action_lookup(request.player_id()).await;
        }
        let metadata_resolved = metadata.is_some();
        result.enrich(request.player_id(), metadata.as_ref());

        let record = HistoryRecord::from_result(request, &result);
        let persistence = self.persist(record.clone());

        info!(
            strategy = %strategy_id,
            likes_sent = result.likes_sent,
            capped = result.is_capped(),
            "Dispatch complete"
        );

        DispatchReport {
            result,
            record,
            attempts,
            strategy_id,
            metadata_resolved,
            persistence,
        }
    }

    /// Starts the metadata lookup bounded by `metadata_timeout`.
    fn spawn_metadata_lookup(&self, player_id: &str) -> JoinHandle<Option<PlayerMetadata>> {
        let ctx = Arc::clone(&self.ctx);
        let lookup = Arc::clone(&self.metadata);
        let player_id = player_id.to_string();
        let limit = ctx.settings.metadata_timeout;

        tokio::spawn(async move {
            match tokio::time::timeout(limit, lookup.lookup(&ctx, &player_id)).await {
                Ok(found) => found,
                Err(_) => {
                    debug!(lookup = lookup.name(), "Metadata lookup timed out");
                    None
                }
            }
        })
    }

    /// Waits at most `metadata_grace` for a lookup, abandoning it otherwise.
    async fn await_metadata(
        &self,
        mut handle: JoinHandle<Option<PlayerMetadata>>,
    ) -> Option<PlayerMetadata> {
        match tokio::time::timeout(self.ctx.settings.metadata_grace, &mut handle).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                warn!(error = %e, "Metadata lookup task failed");
                None
            }
            Err(_) => {
                handle.abort();
                debug!("Metadata lookup still pending after delivery, abandoned");
                None
            }
        }
    }

    /// Runs the action lookup, if any, bounded by `metadata_timeout`.
    async fn run_action_lookup(&self, player_id: &str) -> Option<PlayerMetadata> {
        let lookup = self.action_lookup.as_ref()?;
        let limit = self.ctx.settings.metadata_timeout;

        debug!(lookup = lookup.name(), "Delivered nickname is a placeholder, asking the endpoint");
        match tokio::time::timeout(limit, lookup.lookup(&self.ctx, player_id)).await {
            Ok(found) => found,
            Err(_) => {
                debug!(lookup = lookup.name(), "Action lookup timed out");
                None
            }
        }
    }

    /// Hands `record` to the sink on a detached task.
    fn persist(&self, record: HistoryRecord) -> JoinHandle<()> {
        let sink = Arc::clone(&self.history);

        tokio::spawn(async move {
            let id = record.id.clone();
            match sink.record(record).await {
                Ok(()) => debug!(sink = sink.name(), id = %id, "History record stored"),
                Err(e) => warn!(sink = sink.name(), error = %e, "Failed to store history record"),
            }
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("ctx", &self.ctx)
            .field("strategies", &self.chain.len())
            .field("metadata", &self.metadata.name())
            .field("action_lookup", &self.action_lookup.as_ref().map(|l| l.name().to_string()))
            .field("history", &self.history.name())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
