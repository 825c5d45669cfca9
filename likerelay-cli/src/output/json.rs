//! JSON output formatting.

use anyhow::Result;
use likerelay_core::{LikeRequest, LikeResult};
use likerelay_fetch::DeliveryAttempt;
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// Output for one send.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutput {
    pub player_id: String,
    pub quantity: u32,
    pub nickname: String,
    pub region: String,
    pub level: u32,
    pub exp: u64,
    pub likes_before: u64,
    pub likes_after: u64,
    pub likes_sent: u64,
    /// The player already received likes in the last 24h.
    pub limit_reached: bool,
    pub strategy: String,
    pub attempts: Vec<AttemptOutput>,
}

/// One transport attempt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutput {
    pub strategy: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl SendOutput {
    /// Builds the output from a dispatch report's parts.
    pub fn from_report(
        request: &LikeRequest,
        result: &LikeResult,
        strategy_id: &str,
        attempts: &[DeliveryAttempt],
    ) -> Self {
        Self {
            player_id: request.player_id().to_string(),
            quantity: request.quantity(),
            nickname: result.nickname.clone(),
            region: result.region.clone(),
            level: result.player_level,
            exp: result.player_exp,
            likes_before: result.likes_before,
            likes_after: result.likes_after,
            likes_sent: result.likes_sent,
            limit_reached: result.is_capped(),
            strategy: strategy_id.to_string(),
            attempts: attempts.iter().map(AttemptOutput::from).collect(),
        }
    }
}

impl From<&DeliveryAttempt> for AttemptOutput {
    fn from(attempt: &DeliveryAttempt) -> Self {
        Self {
            strategy: attempt.strategy_id.clone(),
            success: attempt.success,
            error: attempt.error.clone(),
            duration_ms: u64::try_from(attempt.duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use likerelay_fetch::{ErrorKind, StrategyKind};
    use std::time::Duration;

    fn sample_output(before: u64, after: u64) -> SendOutput {
        let request = LikeRequest::new("12345678", 100).unwrap();
        let result = LikeResult {
            likes_before: before,
            likes_after: after,
            likes_sent: after - before,
            player_exp: 52_340,
            player_level: 42,
            nickname: "DragonSlayer99".to_string(),
            region: "BR".to_string(),
        };
        let attempts = vec![
            DeliveryAttempt::failure(
                "relay",
                StrategyKind::Proxied,
                ErrorKind::Network,
                "Network error: connection refused",
                Duration::from_millis(120),
            ),
            DeliveryAttempt::success("callback", StrategyKind::CallbackChannel, Duration::from_millis(840)),
        ];
        SendOutput::from_report(&request, &result, "callback", &attempts)
    }

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_send_output_fields() {
        let output = JsonFormatter::new(false)
            .format(&sample_output(1200, 1300))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["playerId"], "12345678");
        assert_eq!(value["likesSent"], 100);
        assert_eq!(value["limitReached"], false);
        assert_eq!(value["attempts"][0]["durationMs"], 120);
        assert!(value["attempts"][1].get("error").is_none());
    }

    #[test]
    fn test_limit_reached() {
        assert!(sample_output(500, 500).limit_reached);
    }
}
