//! Property-based tests for input bounds and persisted-shape checks

use proptest::prelude::*;
use rdpman_core::ValidationError;
use rdpman_core::validation::{
    MAX_HOSTNAME_LENGTH, MAX_PASSWORD_LENGTH, is_connection_array, validate_group,
    validate_hostname, validate_password, validate_username,
};
use serde_json::json;

use super::arb_connections;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Hostnames are accepted exactly up to the bound, counted in characters
    #[test]
    fn prop_hostname_bound_is_inclusive(len in 1usize..400, ch in prop::sample::select(vec!['a', 'é', '語'])) {
        let hostname: String = std::iter::repeat_n(ch, len).collect();
        let result = validate_hostname(&hostname);
        if len <= MAX_HOSTNAME_LENGTH {
            prop_assert!(result.is_ok());
        } else {
            let is_too_long = matches!(
                result,
                Err(ValidationError::TooLong { max: MAX_HOSTNAME_LENGTH, actual, .. }) if actual == len
            );
            prop_assert!(is_too_long);
        }
    }

    /// Passwords get the larger bound
    #[test]
    fn prop_password_bound_is_inclusive(len in 1usize..1200) {
        let password = "p".repeat(len);
        prop_assert_eq!(validate_password(&password).is_ok(), len <= MAX_PASSWORD_LENGTH);
    }

    /// Whitespace-only usernames and hostnames are rejected as empty
    #[test]
    fn prop_blank_input_is_empty(spaces in 0usize..10) {
        let blank = " ".repeat(spaces);
        let hostname_empty = matches!(validate_hostname(&blank), Err(ValidationError::Empty { .. }));
        let username_empty = matches!(validate_username(&blank), Err(ValidationError::Empty { .. }));
        prop_assert!(hostname_empty);
        prop_assert!(username_empty);
        prop_assert!(validate_group(Some(&blank)).is_ok());
    }

    /// Serialized connections always pass the persisted-shape check
    #[test]
    fn prop_serialized_connections_pass_shape_check(connections in arb_connections(12)) {
        let value = serde_json::to_value(&connections).unwrap();
        prop_assert!(is_connection_array(&value));
    }

    /// A non-string hostname anywhere fails the whole collection
    #[test]
    fn prop_wrong_field_type_fails_shape_check(connections in arb_connections(8), bad in 0usize..8) {
        let mut value = serde_json::to_value(&connections).unwrap();
        if let Some(items) = value.as_array_mut() {
            if items.is_empty() {
                items.push(json!({"id": "x", "hostname": 1}));
            } else {
                let index = bad % items.len();
                items[index]["hostname"] = json!(42);
            }
        }
        prop_assert!(!is_connection_array(&value));
    }
}
