/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;
use std::fs;

use crate::common;
use dataset_translator::app_config::{Config, LogLevel};

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.target_language, "zh-Hant");
    let written: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(written.job.chunk_size, config.job.chunk_size);
    Ok(())
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "target_language": "ja",
            "job": { "workers": 8, "chunk_size": 50, "start_offset": 100 },
            "rate_limit": { "max_calls": 10, "window_secs": 30 },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.target_language, "ja");
    assert_eq!(config.job.workers, 8);
    assert_eq!(config.job.chunk_size, 50);
    assert_eq!(config.job.start_offset, 100);
    assert_eq!(config.rate_limit.max_calls, 10);
    assert_eq!(config.retry.max_attempts, 10);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_validate_withUnknownLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "zz-Latn".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = Config::default();
    config.provider.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validateCredentials_withoutApiKey_shouldFail() {
    let mut config = Config::default();
    assert!(config.validate_credentials().is_err());

    config.provider.api_key = "sk-test".to_string();
    assert!(config.validate_credentials().is_ok());
}
