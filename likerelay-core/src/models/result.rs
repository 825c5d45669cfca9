//! Like result type.

use serde::{Deserialize, Serialize};

use super::player::{friendly_nickname, is_placeholder_nickname, PlayerMetadata};

/// Normalized outcome of one like dispatch.
///
/// Either parsed in full from a remote payload or synthesized locally; never
/// partially populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResult {
    /// Like count before the action.
    pub likes_before: u64,
    /// Like count after the action.
    pub likes_after: u64,
    /// Likes the remote reports as sent.
    pub likes_sent: u64,
    /// Player experience points.
    pub player_exp: u64,
    /// Player level.
    pub player_level: u32,
    /// Display name.
    pub nickname: String,
    /// Server region.
    pub region: String,
}

impl LikeResult {
    /// Returns true if the remote applied nothing (before == after).
    ///
    /// The remote signals its per-player daily cap this way. Structurally
    /// this is still a valid result.
    pub fn is_capped(&self) -> bool {
        self.likes_before == self.likes_after
    }

    /// Returns true if the nickname carries no real information.
    pub fn has_placeholder_nickname(&self) -> bool {
        is_placeholder_nickname(&self.nickname)
    }

    /// Merges side-lookup metadata into this result.
    ///
    /// Genuine metadata overwrites nickname and region. Without it, a
    /// placeholder nickname is replaced by a stable friendly name derived
    /// from `player_id`; a real nickname is left untouched.
    pub fn enrich(&mut self, player_id: &str, metadata: Option<&PlayerMetadata>) {
        match metadata {
            Some(meta) if meta.is_genuine() => {
                self.nickname.clone_from(&meta.nickname);
                if !meta.region.trim().is_empty() {
                    self.region.clone_from(&meta.region);
                }
            }
            _ => {
                if self.has_placeholder_nickname() {
                    self.nickname = friendly_nickname(player_id);
                }
            }
        }
    }
}
