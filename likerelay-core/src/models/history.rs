//! History record type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::request::LikeRequest;
use super::result::LikeResult;

/// Durable record of one completed dispatch.
///
/// Built once per request after the result is final, then handed to a
/// history sink. `success` is derived from the result, never supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Opaque unique id.
    pub id: String,
    /// Target player id.
    pub player_id: String,
    /// Nickname after enrichment.
    pub nickname: String,
    /// Region after enrichment.
    pub region: String,
    /// Quantity requested.
    pub quantity: u32,
    /// Like count before the action.
    pub likes_before: u64,
    /// Like count after the action.
    pub likes_after: u64,
    /// Likes the remote reports as sent.
    pub likes_sent: u64,
    /// Player level.
    pub player_level: u32,
    /// Player experience points.
    pub player_exp: u64,
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
    /// True iff likes were actually applied.
    pub success: bool,
}

impl HistoryRecord {
    /// Derives a record from the original request and the final result.
    pub fn from_result(request: &LikeRequest, result: &LikeResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_id: request.player_id().to_string(),
            nickname: result.nickname.clone(),
            region: result.region.clone(),
            quantity: request.quantity(),
            likes_before: result.likes_before,
            likes_after: result.likes_after,
            likes_sent: result.likes_sent,
            player_level: result.player_level,
            player_exp: result.player_exp,
            timestamp: Utc::now(),
            success: !result.is_capped(),
        }
    }
}
