//! Player metadata lookups against the remote endpoint.
//!
//! [`EndpointMetadataLookup`] asks the side query and never touches the
//! action. [`ActionMetadataLookup`] calls the action endpoint itself with a
//! quantity of one, which sends a real like. It reports that through
//! [`MetadataLookup::may_consume_action`] so the dispatcher only runs it after
//! delivery, when the nickname is still a placeholder.

use async_trait::async_trait;
use likerelay_core::{LikeRequest, PlayerMetadata};
use likerelay_fetch::host::http::build_url;
use likerelay_fetch::{
    DeliveryError, DeliveryStrategy, DispatchContext, HttpError, MetadataLookup,
};
use serde_json::Value;
use tracing::{debug, instrument};

/// Nickname keys, in order of preference.
const NICKNAME_KEYS: &[&str] = &["PlayerNickname", "nickname"];

/// Region keys, in order of preference.
const REGION_KEYS: &[&str] = &["PlayerRegion", "region"];

/// Side-query nickname/region lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct EndpointMetadataLookup;

impl EndpointMetadataLookup {
    /// Creates the lookup. It does nothing unless `metadata_url` is set.
    pub fn new() -> Self {
        Self
    }

    async fn side_query(
        ctx: &DispatchContext,
        base: &str,
        player_id: &str,
    ) -> Result<Option<PlayerMetadata>, DeliveryError> {
        let url = build_url(base, &[("uid", player_id)])?;
        let response = ctx.http.get(&url, ctx.settings.metadata_timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                target: "metadata".to_string(),
            });
        }

        let body = response.text().await.map_err(HttpError::from)?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(metadata_from_value(&value))
    }
}

#[async_trait]
impl MetadataLookup for EndpointMetadataLookup {
    fn name(&self) -> &str {
        "endpoint"
    }

    #[instrument(skip(self, ctx))]
    async fn lookup(&self, ctx: &DispatchContext, player_id: &str) -> Option<PlayerMetadata> {
        let base = ctx.settings.metadata_url.as_deref()?;
        match Self::side_query(ctx, base, player_id).await {
            Ok(Some(meta)) => Some(meta),
            Ok(None) => {
                debug!("Side query returned no genuine nickname");
                None
            }
            Err(e) => {
                debug!(error = %e, "Side query failed");
                None
            }
        }
    }
}

/// Reads the nickname back from a one-like delivery.
pub struct ActionMetadataLookup {
    strategy: Box<dyn DeliveryStrategy>,
}

impl ActionMetadataLookup {
    /// Creates a lookup that delivers one like through `strategy`.
    pub fn new(strategy: Box<dyn DeliveryStrategy>) -> Self {
        Self { strategy }
    }
}

#[async_trait]
impl MetadataLookup for ActionMetadataLookup {
    fn name(&self) -> &str {
        "action"
    }

    #[instrument(skip(self, ctx), fields(strategy = self.strategy.id()))]
    async fn lookup(&self, ctx: &DispatchContext, player_id: &str) -> Option<PlayerMetadata> {
        let request = LikeRequest::new(player_id, 1).ok()?;

        match self.strategy.attempt(ctx, &request).await {
            Ok(result) => {
                let meta = PlayerMetadata::new(result.nickname, result.region);
                meta.is_genuine().then_some(meta)
            }
            Err(e) => {
                debug!(error = %e, "Action lookup failed");
                None
            }
        }
    }

    fn may_consume_action(&self) -> bool {
        true
    }
}

/// Extracts genuine metadata from a side-query answer.
fn metadata_from_value(value: &Value) -> Option<PlayerMetadata> {
    let nickname = first_string(value, NICKNAME_KEYS)?;
    let region = first_string(value, REGION_KEYS).unwrap_or_default();
    let meta = PlayerMetadata::new(nickname, region);
    meta.is_genuine().then_some(meta)
}

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
