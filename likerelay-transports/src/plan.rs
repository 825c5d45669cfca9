//! Default dispatch wiring.
//!
//! A plan decides which transports make up the chain and how metadata is
//! looked up, then builds a ready [`Dispatcher`].

use std::sync::Arc;

use likerelay_core::HistorySink;
use likerelay_fetch::{
    CorrelationRegistry, DeliveryStrategy, DispatchContext, Dispatcher, MetadataLookup,
    SimulatedStrategy, StrategyChain,
};

use crate::callback::CallbackChannelStrategy;
use crate::direct::DirectStrategy;
use crate::metadata::{ActionMetadataLookup, EndpointMetadataLookup};
use crate::proxied::ProxiedStrategy;

// ============================================================================
// Dispatch Plan
// ============================================================================

/// How to assemble a dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    /// Registry shared by callback-channel attempts.
    pub registry: Arc<CorrelationRegistry>,
    /// Whether a placeholder nickname may be resolved by sending one like
    /// through the direct transport after delivery.
    pub probe_metadata: bool,
}

impl Default for DispatchPlan {
    fn default() -> Self {
        Self {
            registry: Arc::new(CorrelationRegistry::new()),
            probe_metadata: true,
        }
    }
}

impl DispatchPlan {
    /// Creates the default plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether metadata lookup may probe the action endpoint.
    pub fn probe_metadata(mut self, enabled: bool) -> Self {
        self.probe_metadata = enabled;
        self
    }

    /// Shares `registry` with the callback-channel transport.
    pub fn registry(mut self, registry: Arc<CorrelationRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The transports, in fallback order.
    pub fn strategies(&self) -> Vec<Box<dyn DeliveryStrategy>> {
        vec![
            Box::new(ProxiedStrategy::new()),
            Box::new(CallbackChannelStrategy::with_registry(Arc::clone(
                &self.registry,
            ))),
            Box::new(DirectStrategy::new()),
            Box::new(SimulatedStrategy::new()),
        ]
    }

    /// Builds the fallback chain.
    pub fn build_chain(&self) -> StrategyChain {
        StrategyChain::with_strategies(self.strategies())
    }

    /// Builds the side-effect-free metadata lookup.
    pub fn build_metadata(&self) -> Arc<dyn MetadataLookup> {
        Arc::new(EndpointMetadataLookup::new())
    }

    /// Builds the post-delivery lookup that spends one like, if enabled.
    pub fn build_action_lookup(&self) -> Option<Arc<dyn MetadataLookup>> {
        if !self.probe_metadata {
            return None;
        }
        let lookup = ActionMetadataLookup::new(Box::new(DirectStrategy::new()));
        Some(Arc::new(lookup))
    }

    /// Builds a dispatcher writing history to `history`.
    pub fn build(&self, ctx: Arc<DispatchContext>, history: Arc<dyn HistorySink>) -> Dispatcher {
        let dispatcher =
            Dispatcher::new(ctx, self.build_chain(), history).with_metadata(self.build_metadata());
        match self.build_action_lookup() {
            Some(lookup) => dispatcher.with_action_lookup(lookup),
            None => dispatcher,
        }
    }
}

/// Builds a dispatcher with the default plan.
pub fn default_dispatcher(ctx: Arc<DispatchContext>, history: Arc<dyn HistorySink>) -> Dispatcher {
    DispatchPlan::default().build(ctx, history)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use likerelay_fetch::StrategyKind;

    #[test]
    fn test_default_chain_order() {
        let ctx = DispatchContext::new();
        let chain = DispatchPlan::new().build_chain();
        let kinds: Vec<StrategyKind> = chain.strategy_info(&ctx).iter().map(|i| i.kind).collect();

        assert_eq!(
            kinds,
            vec![
                StrategyKind::Proxied,
                StrategyKind::CallbackChannel,
                StrategyKind::Direct,
                StrategyKind::Simulated,
            ]
        );
        assert!(chain.has_terminal());
    }

    #[test]
    fn test_action_lookup_toggle() {
        let plan = DispatchPlan::new();
        assert!(!plan.build_metadata().may_consume_action());
        assert!(plan.build_action_lookup().is_some_and(|l| l.may_consume_action()));

        let plan = DispatchPlan::new().probe_metadata(false);
        assert!(plan.build_action_lookup().is_none());
    }
}
