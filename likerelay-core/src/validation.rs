//! Input validation.
//!
//! Pure, total predicates on caller-supplied values. The dispatcher runs
//! these before any strategy is invoked.

/// Lowest accepted player id.
pub const MIN_PLAYER_ID: u64 = 10_000_001;

/// Highest accepted player id.
pub const MAX_PLAYER_ID: u64 = 99_999_999_999;

/// Lowest accepted quantity.
pub const MIN_QUANTITY: i64 = 1;

/// Highest accepted quantity.
pub const MAX_QUANTITY: i64 = 1000;

/// Returns true if `raw` is made only of ASCII digits and its value lies in
/// `[MIN_PLAYER_ID, MAX_PLAYER_ID]`.
pub fn validate_player_id(raw: &str) -> bool {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    // Digit strings too long for u64 are out of range anyway.
    raw.parse::<u64>()
        .is_ok_and(|id| (MIN_PLAYER_ID..=MAX_PLAYER_ID).contains(&id))
}

/// Returns true if `quantity` lies in `[MIN_QUANTITY, MAX_QUANTITY]`.
pub fn validate_quantity(quantity: i64) -> bool {
    (MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_bounds() {
        assert!(!validate_player_id("10000000"));
        assert!(validate_player_id("10000001"));
        assert!(validate_player_id("99999999999"));
        assert!(!validate_player_id("100000000000"));
    }

    #[test]
    fn test_player_id_rejects_non_digits() {
        assert!(!validate_player_id(""));
        assert!(!validate_player_id("12345678a"));
        assert!(!validate_player_id("+12345678"));
        assert!(!validate_player_id("-12345678"));
        assert!(!validate_player_id(" 12345678"));
        assert!(!validate_player_id("1234.5678"));
    }

    #[test]
    fn test_player_id_overflow() {
        assert!(!validate_player_id("99999999999999999999999999"));
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(!validate_quantity(0));
        assert!(validate_quantity(1));
        assert!(validate_quantity(1000));
        assert!(!validate_quantity(1001));
        assert!(!validate_quantity(-5));
    }
}
