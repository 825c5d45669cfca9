//! Remote payload parsing and structural validation.
//!
//! Every network strategy funnels its body through [`parse_like_payload`],
//! so the acceptance rule is identical on all transports: both
//! `Likes_Antes` and `Likes_Depois` must be present and numeric, otherwise
//! the whole payload is rejected.

use std::sync::LazyLock;

use likerelay_core::LikeResult;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::DeliveryError;

/// Wire field names of the remote payload.
mod field {
    pub const LIKES_BEFORE: &str = "Likes_Antes";
    pub const LIKES_AFTER: &str = "Likes_Depois";
    pub const LIKES_SENT: &str = "Likes_Enviados";
    pub const PLAYER_EXP: &str = "PlayerEXP";
    pub const PLAYER_LEVEL: &str = "PlayerLevel";
    pub const NICKNAME: &str = "PlayerNickname";
    pub const REGION: &str = "PlayerRegion";
}

/// `name(payload)` with an optional trailing semicolon.
static CALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\((.*)\)\s*;?\s*$")
        .expect("Invalid regex")
});

// ============================================================================
// Like Payload
// ============================================================================

/// Parses and validates a remote "send likes" body.
///
/// # Errors
///
/// Returns [`DeliveryError::InvalidResponse`] for empty or non-object bodies
/// and for bodies lacking numeric before/after counts, and
/// [`DeliveryError::Json`] for malformed JSON.
pub fn parse_like_payload(body: &str) -> Result<LikeResult, DeliveryError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(DeliveryError::InvalidResponse("empty body".to_string()));
    }

    let value: Value = serde_json::from_str(body)?;
    let Value::Object(obj) = value else {
        return Err(DeliveryError::InvalidResponse(
            "payload is not a JSON object".to_string(),
        ));
    };

    let likes_before = required_count(&obj, field::LIKES_BEFORE)?;
    let likes_after = required_count(&obj, field::LIKES_AFTER)?;

    let likes_sent =
        count(&obj, field::LIKES_SENT).unwrap_or_else(|| likes_after.saturating_sub(likes_before));
    let player_exp = count(&obj, field::PLAYER_EXP).unwrap_or(0);
    let player_level = count(&obj, field::PLAYER_LEVEL)
        .map_or(0, |level| u32::try_from(level).unwrap_or(u32::MAX));

    Ok(LikeResult {
        likes_before,
        likes_after,
        likes_sent,
        player_exp,
        player_level,
        nickname: text(&obj, field::NICKNAME),
        region: text(&obj, field::REGION),
    })
}

fn required_count(obj: &Map<String, Value>, key: &str) -> Result<u64, DeliveryError> {
    count(obj, key).ok_or_else(|| {
        let hint = obj
            .get("error")
            .or_else(|| obj.get("message"))
            .and_then(Value::as_str)
            .map(|msg| format!(" (remote says: {msg})"))
            .unwrap_or_default();
        DeliveryError::InvalidResponse(format!("missing or non-numeric {key}{hint}"))
    })
}

/// Non-negative integer from a JSON number. Strings are not counts.
fn count(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    let Value::Number(n) = obj.get(key)? else {
        return None;
    };
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .and_then(|f| format!("{f:.0}").parse().ok())
    })
}

fn text(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// ============================================================================
// Relay Envelope
// ============================================================================

/// Extracts the forwarded body from a relay envelope object.
///
/// If the envelope carries a `status.http_code`, a non-2xx code is reported
/// as the endpoint's own status failure.
///
/// # Errors
///
/// Returns [`DeliveryError::InvalidResponse`] if the envelope lacks a string
/// `field`, or [`DeliveryError::Status`] for a reported non-2xx code.
pub fn extract_envelope(body: &str, field: &str) -> Result<String, DeliveryError> {
    let value: Value = serde_json::from_str(body.trim())?;

    if let Some(code) = value
        .pointer("/status/http_code")
        .and_then(Value::as_u64)
        .and_then(|c| u16::try_from(c).ok())
    {
        if !(200..300).contains(&code) {
            return Err(DeliveryError::Status {
                status: code,
                target: "endpoint via relay".to_string(),
            });
        }
    }

    match value.get(field) {
        Some(Value::String(inner)) => Ok(inner.clone()),
        // Some relays decode JSON bodies themselves.
        Some(inner) if inner.is_object() => Ok(inner.to_string()),
        _ => Err(DeliveryError::InvalidResponse(format!(
            "relay envelope has no {field:?} body"
        ))),
    }
}

// ============================================================================
// Callback Payload
// ============================================================================

/// Splits a callback-wrapped body `name({...})` into the callback name and
/// its payload.
///
/// Returns `None` if the body is not callback-wrapped.
pub fn split_callback(body: &str) -> Option<(&str, &str)> {
    let caps = CALLBACK_RE.captures(body)?;
    let name = caps.get(1)?.as_str();
    let payload = caps.get(2)?.as_str().trim();
    Some((name, payload))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const FULL: &str = r#"{
        "Likes_Antes": 500,
        "Likes_Depois": 600,
        "Likes_Enviados": 100,
        "PlayerEXP": 123456,
        "PlayerLevel": 55,
        "PlayerNickname": "DragonSlayer99",
        "PlayerRegion": "BR"
    }"#;

    #[test]
    fn test_parse_full_payload() {
        let result = parse_like_payload(FULL).unwrap();
        assert_eq!(result.likes_before, 500);
        assert_eq!(result.likes_after, 600);
        assert_eq!(result.likes_sent, 100);
        assert_eq!(result.player_exp, 123_456);
        assert_eq!(result.player_level, 55);
        assert_eq!(result.nickname, "DragonSlayer99");
        assert_eq!(result.region, "BR");
    }

    #[test]
    fn test_parse_capped_payload() {
        let result =
            parse_like_payload(r#"{"Likes_Antes": 500, "Likes_Depois": 500, "Likes_Enviados": 0}"#)
                .unwrap();
        assert!(result.is_capped());
        assert_eq!(result.likes_sent, 0);
    }

    #[test]
    fn test_missing_counts_rejected() {
        let err = parse_like_payload(r#"{"Likes_Antes": 500}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);

        let err = parse_like_payload(r#"{"PlayerNickname": "x"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_non_numeric_counts_rejected() {
        let err = parse_like_payload(r#"{"Likes_Antes": "lots", "Likes_Depois": 1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);

        let err = parse_like_payload(r#"{"Likes_Antes": -1, "Likes_Depois": 1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);

        let err = parse_like_payload(r#"{"Likes_Antes": null, "Likes_Depois": 1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_numeric_strings_rejected() {
        let err = parse_like_payload(r#"{"Likes_Antes": "500", "Likes_Depois": "600"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);

        let err = parse_like_payload(r#"{"Likes_Antes": 500, "Likes_Depois": "600"}"#).unwrap_err();
        assert!(err.to_string().contains("Likes_Depois"));
    }

    #[test]
    fn test_error_message_surfaces_in_detail() {
        let err = parse_like_payload(r#"{"error": "invalid key"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid key"));
    }

    #[test]
    fn test_malformed_and_empty_bodies() {
        assert_eq!(
            parse_like_payload("<html>").unwrap_err().kind(),
            ErrorKind::InvalidResponse
        );
        assert_eq!(
            parse_like_payload("  ").unwrap_err().kind(),
            ErrorKind::InvalidResponse
        );
        assert_eq!(
            parse_like_payload("[1,2]").unwrap_err().kind(),
            ErrorKind::InvalidResponse
        );
    }

    #[test]
    fn test_extract_envelope() {
        let body = serde_json::json!({
            "contents": FULL,
            "status": {"http_code": 200}
        })
        .to_string();
        let inner = extract_envelope(&body, "contents").unwrap();
        assert_eq!(parse_like_payload(&inner).unwrap().likes_after, 600);
    }

    #[test]
    fn test_extract_envelope_reports_status() {
        let body = r#"{"contents": "", "status": {"http_code": 503}}"#;
        let err = extract_envelope(body, "contents").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_extract_envelope_missing_field() {
        let err = extract_envelope(r#"{"other": 1}"#, "contents").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_split_callback() {
        let (name, payload) = split_callback(r#"likerelay_cb_ab12({"a": 1});"#).unwrap();
        assert_eq!(name, "likerelay_cb_ab12");
        assert_eq!(payload, r#"{"a": 1}"#);

        assert!(split_callback(r#"{"a": 1}"#).is_none());
        assert!(split_callback("alert(1").is_none());
    }
}
