//! Delivery through a public pass-through relay.

use async_trait::async_trait;
use likerelay_core::{LikeRequest, LikeResult};
use likerelay_fetch::host::http::build_url;
use likerelay_fetch::{
    action_url, cache_buster, extract_envelope, parse_like_payload, DeliveryError,
    DeliveryStrategy, DispatchContext, HttpError, RelayEnvelope, StrategyKind,
};
use tracing::{debug, instrument};

/// Strategy id of the relay transport.
pub const PROXIED_ID: &str = "relay";

/// Asks the relay to fetch the action URL and return its body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxiedStrategy;

impl ProxiedStrategy {
    /// Creates a new relay strategy.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DeliveryStrategy for ProxiedStrategy {
    fn id(&self) -> &str {
        PROXIED_ID
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Proxied
    }

    #[instrument(skip(self, ctx, request), fields(uid = %request.player_id()))]
    async fn attempt(
        &self,
        ctx: &DispatchContext,
        request: &LikeRequest,
    ) -> Result<LikeResult, DeliveryError> {
        let settings = &ctx.settings;

        let stamp = cache_buster();
        let target = action_url(settings, request, &[("_t", stamp.as_str())])?;
        let url = build_url(&settings.relay_url, &[("url", target.as_str())])?;

        let response = ctx.http.get(&url, settings.proxied_timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                target: "relay".to_string(),
            });
        }

        let body = response.text().await.map_err(HttpError::from)?;
        debug!(bytes = body.len(), "Relay answered");

        let payload = match &settings.relay_envelope {
            RelayEnvelope::Raw => body,
            RelayEnvelope::Wrapped { field } => extract_envelope(&body, field)?,
        };
        parse_like_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use likerelay_fetch::{DispatchSettings, ErrorKind};
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "Likes_Antes": 500,
            "Likes_Depois": 600,
            "Likes_Enviados": 100,
            "PlayerEXP": 123456,
            "PlayerLevel": 55,
            "PlayerNickname": "DragonSlayer99",
            "PlayerRegion": "BR"
        })
    }

    fn ctx(server: &MockServer, envelope: RelayEnvelope) -> DispatchContext {
        DispatchContext::with_settings(
            DispatchSettings::default()
                .with_endpoint("https://likes.example/api/likes")
                .with_credential("k3y")
                .with_relay(server.url("/raw"), envelope),
        )
    }

    fn request() -> LikeRequest {
        LikeRequest::new("12345678", 100).unwrap()
    }

    #[tokio::test]
    async fn test_raw_relay_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/raw");
            then.status(200).json_body(payload());
        });

        let result = ProxiedStrategy::new()
            .attempt(&ctx(&server, RelayEnvelope::Raw), &request())
            .await
            .unwrap();

        assert_eq!(result.likes_before, 500);
        assert_eq!(result.likes_after, 600);
        assert_eq!(result.nickname, "DragonSlayer99");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_wrapped_relay_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/raw");
            then.status(200).json_body(json!({
                "contents": payload().to_string(),
                "status": {"http_code": 200}
            }));
        });

        let envelope = RelayEnvelope::Wrapped {
            field: "contents".to_string(),
        };
        let result = ProxiedStrategy::new()
            .attempt(&ctx(&server, envelope), &request())
            .await
            .unwrap();

        assert_eq!(result.likes_sent, 100);
    }

    #[tokio::test]
    async fn test_relay_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/raw");
            then.status(502).body("bad gateway");
        });

        let err = ProxiedStrategy::new()
            .attempt(&ctx(&server, RelayEnvelope::Raw), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_relay_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/raw");
            then.status(200).body("<html>blocked</html>");
        });

        let err = ProxiedStrategy::new()
            .attempt(&ctx(&server, RelayEnvelope::Raw), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_relay_unreachable() {
        let ctx = DispatchContext::with_settings(
            DispatchSettings::default().with_relay("http://127.0.0.1:9/raw", RelayEnvelope::Raw),
        );

        let err = ProxiedStrategy::new()
            .attempt(&ctx, &request())
            .await
            .unwrap_err();

        assert_ne!(err.kind(), ErrorKind::InvalidResponse);
    }
}
