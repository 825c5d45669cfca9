//! Terminal, network-free strategy.
//!
//! Produces a plausible result locally when every real transport has
//! failed. Never fails.

use async_trait::async_trait;
use likerelay_core::{placeholder_nickname, LikeRequest, LikeResult};
use rand::Rng;
use tracing::{info, instrument};

use crate::context::{DispatchContext, SimulationRange};
use crate::error::DeliveryError;
use crate::strategy::{DeliveryStrategy, StrategyKind};

/// Strategy id of the simulated transport.
pub const SIMULATED_ID: &str = "simulated";

/// Local result synthesis.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedStrategy;

impl SimulatedStrategy {
    /// Creates a new simulated strategy.
    pub fn new() -> Self {
        Self
    }

    /// Synthesizes a result for `request`.
    ///
    /// `likes_after` is always `likes_before + quantity`, and the nickname is
    /// the player's placeholder.
    pub fn simulate(request: &LikeRequest, range: &SimulationRange, region: &str) -> LikeResult {
        let mut rng = rand::thread_rng();
        let quantity = u64::from(request.quantity());

        // An inverted range collapses to its minimum.
        let likes_before = rng.gen_range(
            range.likes_before_min..=range.likes_before_max.max(range.likes_before_min),
        );
        let player_exp = rng.gen_range(range.exp_min..=range.exp_max.max(range.exp_min));
        let player_level = rng.gen_range(range.level_min..=range.level_max.max(range.level_min));

        LikeResult {
            likes_before,
            likes_after: likes_before.saturating_add(quantity),
            likes_sent: quantity,
            player_exp,
            player_level,
            nickname: placeholder_nickname(request.player_id()),
            region: region.to_string(),
        }
    }
}

#[async_trait]
impl DeliveryStrategy for SimulatedStrategy {
    fn id(&self) -> &str {
        SIMULATED_ID
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Simulated
    }

    #[instrument(skip(self, ctx, request), fields(uid = %request.player_id()))]
    async fn attempt(
        &self,
        ctx: &DispatchContext,
        request: &LikeRequest,
    ) -> Result<LikeResult, DeliveryError> {
        info!("Synthesizing result locally");
        Ok(Self::simulate(
            request,
            &ctx.settings.simulation,
            &ctx.settings.default_region,
        ))
    }
}
