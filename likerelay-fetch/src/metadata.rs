//! Player metadata lookup seam.
//!
//! Lookups are best-effort: they never fail the dispatch, they either return
//! genuine metadata or `None`.

use async_trait::async_trait;
use likerelay_core::PlayerMetadata;

use crate::context::DispatchContext;

/// Best-effort lookup of a player's nickname and region.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Name of this lookup, for logs.
    fn name(&self) -> &str;

    /// Looks up metadata for `player_id`.
    ///
    /// Returns `None` on any failure or when only placeholder data is found.
    async fn lookup(&self, ctx: &DispatchContext, player_id: &str) -> Option<PlayerMetadata>;

    /// Whether a lookup may itself trigger the remote like action.
    ///
    /// Lookups that call the action endpoint report `true`. The dispatcher
    /// never runs them concurrently with delivery.
    fn may_consume_action(&self) -> bool {
        false
    }
}

/// Lookup that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadataLookup;

#[async_trait]
impl MetadataLookup for NoMetadataLookup {
    fn name(&self) -> &str {
        "none"
    }

    async fn lookup(&self, _ctx: &DispatchContext, _player_id: &str) -> Option<PlayerMetadata> {
        None
    }
}
