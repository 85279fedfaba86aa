//! Tests for configuration validation.
//!
//! Builder setters reject invalid values with a panic; configurations read
//! from JSON are checked by `validate` instead.

use std::io::Write;

use sdt_hier::{Config, ConfigError};

// =============================================================================
// BUILDER VALIDATION
// =============================================================================

#[test]
#[should_panic(expected = "draws must be > 0")]
fn draws_zero_panics() {
    let _ = Config::new().draws(0);
}

#[test]
#[should_panic(expected = "chains must be > 0")]
fn chains_zero_panics() {
    let _ = Config::new().chains(0);
}

#[test]
#[should_panic(expected = "target_accept must be in (0, 1)")]
fn target_accept_one_panics() {
    let _ = Config::new().target_accept(1.0);
}

#[test]
#[should_panic(expected = "target_accept must be in (0, 1)")]
fn target_accept_zero_panics() {
    let _ = Config::new().target_accept(0.0);
}

#[test]
#[should_panic(expected = "max_tree_depth must be in 1..=20")]
fn tree_depth_zero_panics() {
    let _ = Config::new().max_tree_depth(0);
}

#[test]
#[should_panic(expected = "init_jitter must be finite and >= 0")]
fn negative_jitter_panics() {
    let _ = Config::new().init_jitter(-0.5);
}

#[test]
fn tune_zero_valid() {
    let config = Config::new().tune(0);
    assert_eq!(config.tune, 0);
    assert!(config.validate().is_ok());
}

#[test]
fn builder_chain_sets_fields() {
    let config = Config::quick()
        .draws(250)
        .chains(3)
        .target_accept(0.99)
        .max_tree_depth(8)
        .seed(42);
    assert_eq!(config.draws, 250);
    assert_eq!(config.chains, 3);
    assert_eq!(config.target_accept, 0.99);
    assert_eq!(config.max_tree_depth, 8);
    assert_eq!(config.seed, 42);
}

// =============================================================================
// VALIDATE / JSON
// =============================================================================

#[test]
fn validate_reports_first_invalid_field() {
    let config = Config {
        chains: 0,
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroChains)));

    let config = Config {
        target_accept: f64::NAN,
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::TargetAccept(_))));
}

#[test]
fn json_missing_fields_take_defaults() {
    let config = Config::from_json_str(r#"{ "draws": 300, "chains": 2 }"#).unwrap();
    assert_eq!(config.draws, 300);
    assert_eq!(config.chains, 2);
    assert_eq!(config.tune, Config::default().tune);
}

#[test]
fn json_invalid_values_are_rejected() {
    assert!(matches!(
        Config::from_json_str(r#"{ "target_accept": 1.5 }"#),
        Err(ConfigError::TargetAccept(_))
    ));
    assert!(matches!(
        Config::from_json_str("{ not json"),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn json_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", serde_json::to_string(&Config::thorough()).unwrap()).unwrap();
    let config = Config::from_json_file(file.path()).unwrap();
    assert_eq!(config, Config::thorough());

    let missing = Config::from_json_file(std::path::Path::new("/nonexistent/fit.json"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));
}
