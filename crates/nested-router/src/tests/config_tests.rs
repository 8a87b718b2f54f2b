//! Configuration tests
//!
//! Defaults must be usable as-is, and validation must reject settings the
//! router cannot honor.

use proptest::prelude::*;
use std::time::Duration;

use crate::config::{ConfigValidationError, RouterConfig};

// =============================================================================
// Property-Based Tests
// =============================================================================

proptest! {
    /// Default configuration passes validation and is production-safe.
    #[test]
    fn prop_configuration_defaults_are_valid(_dummy in 0..1i32) {
        let config = RouterConfig::default();

        prop_assert!(config.validate().is_ok(), "Default config should be valid");
        prop_assert!(config.case_sensitive, "matching should default to case-sensitive");
        prop_assert!(config.max_depth >= 8, "max_depth should allow realistic nesting");
        prop_assert!(config.loader_timeout().is_none(), "loaders should not time out by default");
        prop_assert!(!config.follow_redirects, "redirects should be handed to the caller");
        prop_assert!(config.max_redirects > 0);
        prop_assert!(!config.debug_logging, "debug_logging should default to false");
    }

    /// Zero values for limits are rejected.
    #[test]
    fn prop_invalid_configs_rejected(
        max_depth in 0usize..2,
        timeout in prop::option::of(0u64..2),
        follow_redirects in any::<bool>(),
        max_redirects in 0usize..2,
    ) {
        let config = RouterConfig {
            max_depth,
            loader_timeout_ms: timeout,
            follow_redirects,
            max_redirects,
            ..RouterConfig::default()
        };

        let invalid = max_depth == 0
            || timeout == Some(0)
            || (follow_redirects && max_redirects == 0);

        if invalid {
            prop_assert!(config.validate().is_err(), "Config {:?} should be invalid", config);
        } else {
            prop_assert!(config.validate().is_ok(), "Config {:?} should be valid", config);
        }
    }

    /// Builder methods with valid values produce valid configs.
    #[test]
    fn prop_builder_pattern_preserves_validity(
        case_sensitive in any::<bool>(),
        max_depth in 1usize..256,
        timeout in 1u64..60_000,
        follow_redirects in any::<bool>(),
        max_redirects in 1usize..32,
        debug_logging in any::<bool>(),
    ) {
        let config = RouterConfig::new()
            .with_case_sensitive(case_sensitive)
            .with_max_depth(max_depth)
            .with_loader_timeout(timeout)
            .with_follow_redirects(follow_redirects)
            .with_max_redirects(max_redirects)
            .with_debug_logging(debug_logging);

        prop_assert!(config.validate().is_ok(), "Builder-created config should be valid");
        prop_assert_eq!(config.case_sensitive, case_sensitive);
        prop_assert_eq!(config.max_depth, max_depth);
        prop_assert_eq!(config.loader_timeout(), Some(Duration::from_millis(timeout)));
        prop_assert_eq!(config.follow_redirects, follow_redirects);
        prop_assert_eq!(config.max_redirects, max_redirects);
        prop_assert_eq!(config.debug_logging, debug_logging);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn test_validation_errors_are_specific() {
    assert_eq!(
        RouterConfig::new().with_max_depth(0).validate(),
        Err(ConfigValidationError::InvalidMaxDepth)
    );
    assert_eq!(
        RouterConfig::new().with_loader_timeout(0).validate(),
        Err(ConfigValidationError::InvalidLoaderTimeout)
    );
    assert_eq!(
        RouterConfig::new()
            .with_follow_redirects(true)
            .with_max_redirects(0)
            .validate(),
        Err(ConfigValidationError::InvalidRedirectBudget)
    );
    // The budget only matters when redirects are followed.
    assert!(RouterConfig::new().with_max_redirects(0).validate().is_ok());
}

#[test]
fn test_from_json_fills_missing_fields_with_defaults() {
    let config = RouterConfig::from_json(r#"{ "case_sensitive": false, "loader_timeout_ms": 2500 }"#)
        .unwrap();

    assert!(!config.case_sensitive);
    assert_eq!(config.loader_timeout(), Some(Duration::from_millis(2500)));
    assert_eq!(config.max_depth, RouterConfig::default().max_depth);
    assert!(!config.follow_redirects);
}

#[test]
fn test_from_json_rejects_invalid_documents() {
    assert!(matches!(
        RouterConfig::from_json("{ not json"),
        Err(ConfigValidationError::Parse(_))
    ));
    assert_eq!(
        RouterConfig::from_json(r#"{ "max_depth": 0 }"#),
        Err(ConfigValidationError::InvalidMaxDepth)
    );
}

#[test]
fn test_config_round_trips_through_json() {
    let config = RouterConfig::new()
        .with_follow_redirects(true)
        .with_max_redirects(2);

    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(RouterConfig::from_json(&json).unwrap(), config);
}
