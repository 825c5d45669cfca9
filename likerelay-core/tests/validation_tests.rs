//! Integration tests for input validation.

use likerelay_core::{validate_player_id, validate_quantity, LikeRequest, ValidationError};

#[test]
fn test_non_numeric_ids_rejected() {
    for raw in ["abc", "1234567a", "12 345 678", "0x1234567", "", "１２３４５６７８"] {
        assert!(!validate_player_id(raw), "accepted {raw:?}");
    }
}

#[test]
fn test_out_of_range_ids_rejected() {
    for raw in ["0", "1", "10000000", "100000000000", "00000000000000000000009"] {
        assert!(!validate_player_id(raw), "accepted {raw:?}");
    }
}

#[test]
fn test_in_range_ids_accepted() {
    for raw in ["10000001", "12345678", "987654321", "99999999999"] {
        assert!(validate_player_id(raw), "rejected {raw:?}");
    }
}

#[test]
fn test_leading_zeros_use_numeric_value() {
    assert!(validate_player_id("012345678"));
}

#[test]
fn test_quantity_range() {
    for q in [i64::MIN, -1, 0, 1001, i64::MAX] {
        assert!(!validate_quantity(q), "accepted {q}");
    }
    for q in [1, 100, 999, 1000] {
        assert!(validate_quantity(q), "rejected {q}");
    }
}

#[test]
fn test_validation_is_pure() {
    for _ in 0..3 {
        assert!(validate_player_id("12345678"));
        assert!(!validate_player_id("1234"));
        assert!(validate_quantity(100));
        assert!(!validate_quantity(0));
    }
}

#[test]
fn test_request_construction_reports_first_failure() {
    let err = LikeRequest::new("abc", 0).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidPlayerId(_)));
}
