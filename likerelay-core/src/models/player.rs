//! Player metadata and nickname rules.

use serde::{Deserialize, Serialize};

/// Prefix of the placeholder nickname used when no real name is known.
const PLACEHOLDER_PREFIX: &str = "Player_";

/// Name templates for friendly display nicknames.
const NAME_TEMPLATES: [&str; 8] = [
    "Shadow", "Phoenix", "Viper", "Falcon", "Titan", "Ronin", "Blaze", "Ghost",
];

/// Human-readable identity of a player, resolved by a side lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMetadata {
    /// Display name.
    pub nickname: String,
    /// Server region (e.g., "BR").
    pub region: String,
}

impl PlayerMetadata {
    /// Creates new metadata.
    pub fn new(nickname: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            region: region.into(),
        }
    }

    /// Returns true if the nickname is a real name rather than a placeholder.
    pub fn is_genuine(&self) -> bool {
        !is_placeholder_nickname(&self.nickname)
    }
}

/// The placeholder nickname for a player id: `Player_<id>`.
pub fn placeholder_nickname(player_id: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{player_id}")
}

/// Returns true if `nickname` carries no real information.
///
/// Empty names and `Player_<digits>` both count as placeholders.
pub fn is_placeholder_nickname(nickname: &str) -> bool {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return true;
    }
    nickname
        .strip_prefix(PLACEHOLDER_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Deterministic friendly nickname for a player id.
///
/// The last two digits pick a template, the last four become the suffix, so
/// the same id always maps to the same name.
pub fn friendly_nickname(player_id: &str) -> String {
    let digits: Vec<u8> = player_id
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();

    let low_two = digits[digits.len().saturating_sub(2)..]
        .iter()
        .fold(0usize, |acc, d| acc * 10 + usize::from(*d));
    let template = NAME_TEMPLATES[low_two % NAME_TEMPLATES.len()];

    let suffix: String = digits[digits.len().saturating_sub(4)..]
        .iter()
        .map(|d| char::from(b'0' + d))
        .collect();

    if suffix.is_empty() {
        template.to_string()
    } else {
        format!("{template}_{suffix}")
    }
}
