//! Tests for retry configuration.

use fabula_error::FabulaErrorKind;
use fabula_retry::{RetryConfig, RetryConfigBuilder};
use std::time::Duration;

#[test]
fn test_defaults_match_documented_values() {
    let config = RetryConfig::default();
    assert_eq!(*config.max_retries(), 3);
    assert_eq!(*config.retry_delay_ms(), 2000);
    assert_eq!(*config.timeout_secs(), 30);
    assert_eq!(config.timeout(), Duration::from_secs(30));
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config: RetryConfig = toml::from_str("max_retries = 5").unwrap();
    assert_eq!(*config.max_retries(), 5);
    assert_eq!(*config.retry_delay_ms(), 2000);
}

#[test]
fn test_zero_attempts_rejected() {
    let config = RetryConfig::default().with_max_retries(0);
    let err = config.validate().unwrap_err();
    match err.kind() {
        FabulaErrorKind::Config(e) => assert_eq!(e.key.as_deref(), Some("retry.max_retries")),
        other => panic!("expected config error, got {other}"),
    }
}

#[test]
fn test_zero_timeout_rejected() {
    let config = RetryConfigBuilder::default().timeout_secs(0u64).build().unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_delay_is_allowed() {
    let config = RetryConfig::default().with_retry_delay_ms(0);
    assert!(config.validate().is_ok());
    assert_eq!(config.retry_delay(), Duration::ZERO);
}
