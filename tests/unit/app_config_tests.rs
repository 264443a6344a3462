/*!
 * Tests for application configuration functionality
 */

use doctrans::app_config::{Config, LogLevel};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.log_level, LogLevel::Info);

    assert_eq!(config.translation.model, "gpt-4o-mini");
    assert_eq!(config.translation.concurrent_requests, 4);
    assert_eq!(config.translation.retry_count, 3);
    assert_eq!(config.translation.batch_max_units, 8);

    assert!(config.protection.custom_tokens.is_empty());
    assert!(!config.protection.require_word_boundaries);
    assert_eq!(config.correction.max_cell_line_length, 100);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.target_language = String::new();
    assert!(config.validate().is_err());
    config.target_language = "fr".to_string();

    config.translation.temperature = 3.5;
    assert!(config.validate().is_err());
    config.translation.temperature = 0.3;

    config.correction.max_cell_line_length = 0;
    assert!(config.validate().is_err());
}

/// Test saving and reloading a configuration file
#[test]
fn test_config_saveAndReload_shouldRoundTrip() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "de".to_string();
    config.protection.custom_tokens.push("MyProduct".to_string());
    config
        .terminology
        .insert("release".to_string(), "Release".to_string());
    config.save(&path).unwrap();

    let reloaded = Config::from_file(&path).unwrap();
    assert_eq!(reloaded.target_language, "de");
    assert_eq!(reloaded.protection.custom_tokens, vec!["MyProduct".to_string()]);
    assert_eq!(reloaded.terminology["release"], "Release");
}

/// Test that a partial config file is filled with defaults
#[test]
fn test_config_fromPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{ "target_language": "ja" }"#).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.target_language, "ja");
    assert_eq!(config.source_language, "en");
    assert_eq!(config.translation.retry_count, 3);
}

/// Test loading a missing file falls back to defaults
#[test]
fn test_config_fromMissingFile_shouldUseDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let config = Config::from_file_or_default(dir.path().join("nope.json")).unwrap();
    assert_eq!(config.target_language, "fr");
}
