//! Direct delivery to the remote endpoint.
//!
//! Two call modes. The first is a bare GET whose answer may be degraded (an
//! empty body is treated as "nothing to inspect"); only then is a second,
//! explicitly JSON-negotiated GET issued. A body that is present but
//! unreadable is a failure in either mode. Both modes share one
//! `direct_timeout` budget.

use std::time::Instant;

use async_trait::async_trait;
use likerelay_core::{LikeRequest, LikeResult};
use likerelay_fetch::{
    action_url, cache_buster, parse_like_payload, DeliveryError, DeliveryStrategy,
    DispatchContext, HttpError, StrategyKind,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Response;
use tracing::{debug, instrument};

/// Strategy id of the direct transport.
pub const DIRECT_ID: &str = "direct";

/// Calls the endpoint without intermediaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectStrategy;

impl DirectStrategy {
    /// Creates a new direct strategy.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DeliveryStrategy for DirectStrategy {
    fn id(&self) -> &str {
        DIRECT_ID
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Direct
    }

    #[instrument(skip(self, ctx, request), fields(uid = %request.player_id()))]
    async fn attempt(
        &self,
        ctx: &DispatchContext,
        request: &LikeRequest,
    ) -> Result<LikeResult, DeliveryError> {
        let settings = &ctx.settings;
        let deadline = Instant::now() + settings.direct_timeout;

        // Mode 1: bare call.
        let url = action_url(settings, request, &[])?;
        let response = ctx.http.get(&url, settings.direct_timeout).await?;
        let body = read_body(response).await?;
        if !body.trim().is_empty() {
            return parse_like_payload(&body);
        }
        debug!("Bare call gave nothing to inspect, retrying with JSON negotiation");

        // Mode 2: readable call, with whatever budget is left.
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(DeliveryError::Timeout(settings.direct_timeout));
        }
        let stamp = cache_buster();
        let url = action_url(settings, request, &[("_t", stamp.as_str())])?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let response = ctx
            .http
            .get_with_headers(&url, headers, remaining)
            .await?;
        let body = read_body(response).await?;
        parse_like_payload(&body)
    }
}

async fn read_body(response: Response) -> Result<String, DeliveryError> {
    let status = response.status();
    if !status.is_success() {
        return Err(DeliveryError::Status {
            status: status.as_u16(),
            target: "endpoint".to_string(),
        });
    }
    let body = response.text().await.map_err(HttpError::from)?;
    Ok(body)
}
