//! Delivery through an out-of-band callback channel.
//!
//! The action URL carries a freshly registered callback token. A detached
//! delivery task loads the URL and routes the callback-wrapped answer
//! (`token({...})`) back through the [`CorrelationRegistry`]; the attempt
//! itself only waits on its registration. The token is released on every
//! exit path, and the delivery task is cancelled with the attempt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use likerelay_core::{LikeRequest, LikeResult};
use likerelay_fetch::{
    action_url, cache_buster, parse_like_payload, split_callback, CorrelationRegistry,
    DeliveryError, DeliveryStrategy, DispatchContext, HttpClient, HttpError, StrategyKind,
};
use reqwest::Url;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace};

/// Strategy id of the callback-channel transport.
pub const CALLBACK_ID: &str = "callback";

/// Query parameter naming the callback.
const CALLBACK_PARAM: &str = "callback";

/// Waits for the endpoint to call back with the result.
#[derive(Debug, Clone, Default)]
pub struct CallbackChannelStrategy {
    registry: Arc<CorrelationRegistry>,
}

impl CallbackChannelStrategy {
    /// Creates a strategy with its own registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strategy sharing `registry`.
    pub fn with_registry(registry: Arc<CorrelationRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the correlation registry.
    pub fn registry(&self) -> &Arc<CorrelationRegistry> {
        &self.registry
    }
}

#[async_trait]
impl DeliveryStrategy for CallbackChannelStrategy {
    fn id(&self) -> &str {
        CALLBACK_ID
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::CallbackChannel
    }

    #[instrument(skip(self, ctx, request), fields(uid = %request.player_id()))]
    async fn attempt(
        &self,
        ctx: &DispatchContext,
        request: &LikeRequest,
    ) -> Result<LikeResult, DeliveryError> {
        let settings = &ctx.settings;
        let mut registration = self.registry.register();

        let stamp = cache_buster();
        let url = action_url(
            settings,
            request,
            &[(CALLBACK_PARAM, registration.token()), ("_t", stamp.as_str())],
        )?;

        let _delivery = DeliveryTask(tokio::spawn(deliver(
            Arc::clone(&ctx.http),
            url,
            Arc::clone(&self.registry),
            registration.token().to_string(),
            settings.callback_timeout,
        )));

        let payload = registration.wait(settings.callback_timeout).await?;
        debug!(bytes = payload.len(), "Callback invoked");
        parse_like_payload(&payload)
    }
}

/// Aborts the delivery task when the attempt ends.
struct DeliveryTask(JoinHandle<()>);

impl Drop for DeliveryTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Loads the action URL and invokes the callback named in the answer.
async fn deliver(
    http: Arc<HttpClient>,
    url: Url,
    registry: Arc<CorrelationRegistry>,
    token: String,
    timeout: Duration,
) {
    let body = match load(&http, &url, timeout).await {
        Ok(body) => body,
        Err(e) => {
            registry.fail(&token, e);
            return;
        }
    };

    match split_callback(&body) {
        Some((name, payload)) if name == token => {
            registry.resolve(name, payload.to_string());
        }
        Some((name, _)) => {
            trace!(callback = %name, "Answer names a different callback");
            registry.fail(
                &token,
                DeliveryError::InvalidResponse(format!("unexpected callback {name:?}")),
            );
        }
        None => {
            registry.fail(
                &token,
                DeliveryError::InvalidResponse("answer is not callback-wrapped".to_string()),
            );
        }
    }
}

async fn load(http: &HttpClient, url: &Url, timeout: Duration) -> Result<String, DeliveryError> {
    let response = http.get(url, timeout).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DeliveryError::Status {
            status: status.as_u16(),
            target: "callback channel".to_string(),
        });
    }
    let body = response.text().await.map_err(HttpError::from)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use likerelay_fetch::{DispatchSettings, ErrorKind};

    const PAYLOAD: &str = r#"{"Likes_Antes": 500, "Likes_Depois": 600, "Likes_Enviados": 100, "PlayerNickname": "DragonSlayer99"}"#;

    fn ctx(server: &MockServer, timeout: Duration) -> DispatchContext {
        DispatchContext::with_settings(
            DispatchSettings::default()
                .with_endpoint(server.url("/api/likes"))
                .with_credential("k3y")
                .with_transport_timeout(timeout),
        )
    }

    fn request() -> LikeRequest {
        LikeRequest::new("12345678", 100).unwrap()
    }

    /// Resolves the first token that shows up in `registry`.
    async fn invoke_callback_out_of_band(registry: Arc<CorrelationRegistry>, payload: &'static str) {
        loop {
            if let Some(token) = registry.pending_tokens().into_iter().next() {
                registry.resolve(&token, payload.to_string());
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_out_of_band_callback_succeeds() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/likes")
                .query_param("uid", "12345678")
                .query_param("quantity", "100")
                .query_param("key", "k3y")
                .query_param_exists("callback");
            then.status(200).delay(Duration::from_secs(2)).body("");
        });

        let strategy = CallbackChannelStrategy::new();
        let caller = tokio::spawn(invoke_callback_out_of_band(
            Arc::clone(strategy.registry()),
            PAYLOAD,
        ));

        let result = strategy
            .attempt(&ctx(&server, Duration::from_secs(5)), &request())
            .await
            .unwrap();
        caller.await.unwrap();

        assert_eq!(result.likes_sent, 100);
        assert_eq!(result.nickname, "DragonSlayer99");
        assert_eq!(strategy.registry().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_callback_payload_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/likes");
            then.status(200).delay(Duration::from_secs(2)).body("");
        });

        let strategy = CallbackChannelStrategy::new();
        tokio::spawn(invoke_callback_out_of_band(
            Arc::clone(strategy.registry()),
            r#"{"Likes_Antes": 500}"#,
        ));

        let err = strategy
            .attempt(&ctx(&server, Duration::from_secs(5)), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert_eq!(strategy.registry().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_callback_not_wrapped_fails_and_releases_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/likes")
                .query_param("uid", "12345678")
                .query_param("quantity", "100")
                .query_param("key", "k3y");
            then.status(200).body(PAYLOAD);
        });

        let strategy = CallbackChannelStrategy::new();
        let err = strategy
            .attempt(&ctx(&server, Duration::from_secs(5)), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert_eq!(strategy.registry().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_callback_for_other_name_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/likes");
            then.status(200).body(format!("somebody_else({PAYLOAD});"));
        });

        let strategy = CallbackChannelStrategy::new();
        let err = strategy
            .attempt(&ctx(&server, Duration::from_secs(5)), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert_eq!(strategy.registry().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_load_failure_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/likes");
            then.status(503);
        });

        let strategy = CallbackChannelStrategy::new();
        let err = strategy
            .attempt(&ctx(&server, Duration::from_secs(5)), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(strategy.registry().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_callback_never_invoked_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/likes");
            then.status(200).delay(Duration::from_secs(5)).body("");
        });

        let strategy = CallbackChannelStrategy::new();
        let err = strategy
            .attempt(&ctx(&server, Duration::from_millis(100)), &request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(strategy.registry().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_callback_after_attempt_is_noop() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/likes");
            then.status(200).delay(Duration::from_secs(5)).body("");
        });

        let strategy = CallbackChannelStrategy::new();
        let registry = Arc::clone(strategy.registry());
        let observer = tokio::spawn(async move {
            loop {
                if let Some(token) = registry.pending_tokens().into_iter().next() {
                    return token;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let err = strategy
            .attempt(&ctx(&server, Duration::from_millis(200)), &request())
            .await
            .unwrap_err();
        let token = observer.await.unwrap();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(!strategy.registry().is_pending(&token));
        assert!(!strategy.registry().resolve(&token, PAYLOAD.to_string()));
    }
}
