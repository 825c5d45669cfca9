//! HTTP client with tracing and credential redaction.
//!
//! This module provides a wrapped HTTP client that adds:
//! - Request/response tracing
//! - Per-request timeouts
//! - Query URL building with the shared credential redacted from logs

use reqwest::{header::HeaderMap, Client, Response};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::HttpError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for LikeRelay.
const USER_AGENT: &str = concat!("LikeRelay/", env!("CARGO_PKG_VERSION"));

/// Query parameters whose values never reach the logs.
const SECRET_PARAMS: &[&str] = &["key"];

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and per-request timeouts.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom overall timeout.
    ///
    /// Falls back to reqwest's default client if the configured builder
    /// cannot be constructed.
    pub fn with_timeout(timeout: Duration) -> Self {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build configured HTTP client, using defaults");
                Client::new()
            });

        Self { inner }
    }

    /// Performs a GET request bounded by `timeout`.
    #[instrument(skip(self, url), fields(url = %redact(url)))]
    pub async fn get(&self, url: &Url, timeout: Duration) -> Result<Response, HttpError> {
        debug!("GET request");

        let response = self
            .inner
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(HttpError::from)?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a GET request with custom headers, bounded by `timeout`.
    #[instrument(skip(self, url, headers), fields(url = %redact(url)))]
    pub async fn get_with_headers(
        &self,
        url: &Url,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Response, HttpError> {
        debug!("GET request with headers");

        let response = self
            .inner
            .get(url.clone())
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(HttpError::from)?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// URL Helpers
// ============================================================================

/// Parses `base` and appends `params` as query pairs.
pub fn build_url(base: &str, params: &[(&str, &str)]) -> Result<Url, HttpError> {
    let mut url = Url::parse(base).map_err(|e| HttpError::InvalidUrl(format!("{base}: {e}")))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Renders `url` for logging with secret query values masked, including
/// those of URLs nested in query values.
pub fn redact(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if SECRET_PARAMS.contains(&k.as_ref()) {
                "***".to_string()
            } else if let Ok(nested) = Url::parse(&v) {
                // Relay targets carry the whole endpoint URL as a value.
                redact(&nested)
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_appends_params() {
        let url = build_url(
            "https://example.com/api/likes",
            &[("uid", "12345678"), ("quantity", "100")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/likes?uid=12345678&quantity=100"
        );
    }

    #[test]
    fn test_build_url_keeps_existing_query() {
        let url = build_url("https://relay.example/raw?mode=1", &[("url", "x")]).unwrap();
        assert_eq!(url.as_str(), "https://relay.example/raw?mode=1&url=x");
    }

    #[test]
    fn test_build_url_invalid() {
        assert!(build_url("not-a-valid-url", &[]).is_err());
    }

    #[test]
    fn test_redact_masks_key() {
        let url = build_url(
            "https://example.com/api/likes",
            &[("uid", "12345678"), ("key", "hunter2")],
        )
        .unwrap();
        let shown = redact(&url);
        assert!(shown.contains("uid=12345678"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_redact_masks_nested_key() {
        let target = build_url("https://example.com/api/likes", &[("key", "hunter2")]).unwrap();
        let url = build_url("https://relay.example/raw", &[("url", target.as_str())]).unwrap();
        let shown = redact(&url);
        assert!(shown.starts_with("https://relay.example/raw?url="));
        assert!(!shown.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_get_against_mock_server() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/ping").query_param("uid", "12345678");
            then.status(200).body("pong");
        });

        let url = build_url(&server.url("/ping"), &[("uid", "12345678")]).unwrap();
        let response = HttpClient::new()
            .get(&url, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(response.text().await.unwrap(), "pong");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_timeout_is_classified() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_secs(2));
        });

        let url = build_url(&server.url("/slow"), &[]).unwrap();
        let err = HttpClient::new()
            .get(&url, Duration::from_millis(100))
            .await
            .unwrap_err();

        assert!(matches!(err, HttpError::Timeout));
    }

    #[tokio::test]
    async fn test_request_error_drops_url() {
        let url = build_url("http://127.0.0.1:9/api/likes", &[("key", "s3cretKEY")]).unwrap();
        let err = HttpClient::new()
            .get(&url, Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(matches!(err, HttpError::Request(_)));
        assert!(!err.to_string().contains("s3cretKEY"));
    }
}
