//! Remote action URL construction.

use chrono::Utc;
use likerelay_core::LikeRequest;
use url::Url;

use crate::context::DispatchSettings;
use crate::error::HttpError;
use crate::host::http::build_url;

/// Builds the "send likes" URL for `request` against the configured endpoint.
///
/// Carries `uid`, `quantity` and the shared `key`, followed by `extra`
/// parameters (cache-busting timestamp, callback name, ...).
pub fn action_url(
    settings: &DispatchSettings,
    request: &LikeRequest,
    extra: &[(&str, &str)],
) -> Result<Url, HttpError> {
    let quantity = request.quantity().to_string();
    let mut params: Vec<(&str, &str)> = vec![
        ("uid", request.player_id()),
        ("quantity", quantity.as_str()),
        ("key", settings.credential.as_str()),
    ];
    params.extend_from_slice(extra);
    build_url(&settings.endpoint_url, &params)
}

/// Millisecond timestamp for cache-defeating query parameters.
pub fn cache_buster() -> String {
    Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_url() {
        let settings = DispatchSettings::default()
            .with_endpoint("https://example.com/api/likes")
            .with_credential("k3y");
        let request = LikeRequest::new("12345678", 100).unwrap();

        let url = action_url(&settings, &request, &[("_t", "1")]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/likes?uid=12345678&quantity=100&key=k3y&_t=1"
        );
    }

    #[test]
    fn test_cache_buster_is_numeric() {
        let value = cache_buster();
        assert!(!value.is_empty());
        assert!(value.bytes().all(|b| b.is_ascii_digit()));
    }
}
