//! Classifier API key resolution
//!
//! Every test touches WSW_CLASSIFIER_API_KEY, so all of them are #[serial].

use serial_test::serial;
use std::env;
use wsw_common::config::{ClassifierConfig, TomlConfig};
use wsw_intake::config::{is_valid_key, resolve_classifier_api_key, CLASSIFIER_API_KEY_ENV};

fn toml_with_key(key: Option<&str>) -> TomlConfig {
    TomlConfig {
        classifier: ClassifierConfig {
            api_key: key.map(str::to_string),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_env_key_wins_over_toml() {
    env::set_var(CLASSIFIER_API_KEY_ENV, "env-key");
    let key = resolve_classifier_api_key(&toml_with_key(Some("toml-key")));
    env::remove_var(CLASSIFIER_API_KEY_ENV);

    assert_eq!(key.as_deref(), Some("env-key"));
}

#[test]
#[serial]
fn test_toml_key_used_without_env() {
    env::remove_var(CLASSIFIER_API_KEY_ENV);
    let key = resolve_classifier_api_key(&toml_with_key(Some("toml-key")));
    assert_eq!(key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_blank_env_key_falls_through() {
    env::set_var(CLASSIFIER_API_KEY_ENV, "   ");
    let key = resolve_classifier_api_key(&toml_with_key(Some("toml-key")));
    env::remove_var(CLASSIFIER_API_KEY_ENV);

    assert_eq!(key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_no_key_anywhere() {
    env::remove_var(CLASSIFIER_API_KEY_ENV);
    assert_eq!(resolve_classifier_api_key(&toml_with_key(None)), None);
    assert_eq!(resolve_classifier_api_key(&toml_with_key(Some(""))), None);
}

#[test]
fn test_key_validation() {
    assert!(is_valid_key("abc"));
    assert!(!is_valid_key(""));
    assert!(!is_valid_key(" \t"));
}
