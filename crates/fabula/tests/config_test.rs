//! Tests for layered configuration and credentials.

use fabula::{Credentials, FabulaConfig, FabulaErrorKind};
use std::time::Duration;

#[test]
fn test_bundled_defaults() -> anyhow::Result<()> {
    let config = FabulaConfig::from_toml_str("")?;

    assert_eq!(*config.retry().max_retries(), 3);
    assert_eq!(config.retry().retry_delay(), Duration::from_secs(2));
    assert_eq!(config.retry().timeout(), Duration::from_secs(30));
    assert_eq!(config.chat().model(), "deepseek-ai/DeepSeek-V3");
    assert_eq!(config.speech().primary_language(), "en");
    assert_eq!(*config.video().fps(), 24);
    assert_eq!(config.upload().privacy_status(), "private");
    assert_eq!(config.pipeline().languages(), &vec!["en".to_string()]);
    Ok(())
}

#[test]
fn test_bundled_file_matches_code_defaults() -> anyhow::Result<()> {
    assert_eq!(FabulaConfig::from_toml_str("")?, FabulaConfig::default());
    Ok(())
}

#[test]
fn test_override_keeps_other_keys() -> anyhow::Result<()> {
    let config = FabulaConfig::from_toml_str(
        r#"
        [retry]
        max_retries = 5

        [speech.secondary_voices]
        te = "nova"

        [pipeline]
        languages = ["en", "te"]
        "#,
    )?;

    assert_eq!(*config.retry().max_retries(), 5);
    assert_eq!(*config.retry().retry_delay_ms(), 2000);
    assert_eq!(config.speech().voice_for("te"), "nova");
    assert_eq!(config.speech().voice_for("ta"), "onyx");
    assert_eq!(config.pipeline().languages().len(), 2);
    Ok(())
}

#[test]
fn test_out_of_range_values_are_rejected() {
    for toml in [
        "[retry]\nmax_retries = 0",
        "[retry]\ntimeout_secs = 0",
        "[upload]\nchunk_size = 1000",
        "[video]\nfps = 0",
        "[logging]\nfilter = \"fabula=loud\"",
    ] {
        let err = FabulaConfig::from_toml_str(toml).unwrap_err();
        assert!(
            matches!(err.kind(), FabulaErrorKind::Config(_)),
            "{toml} gave {err}"
        );
    }
}

#[test]
fn test_logging_section_sets_filters() -> anyhow::Result<()> {
    let config = FabulaConfig::from_toml_str(
        "[logging]\nfilter = \"fabula=info,warn\"\njson = true",
    )?;
    assert_eq!(config.logging().default_filter(false), "fabula=info,warn");
    assert_eq!(config.logging().default_filter(true), "debug");
    assert!(*config.logging().json());
    assert!(*config.logging().export_spans());
    Ok(())
}

#[test]
fn test_malformed_toml_is_config_error() {
    let err = FabulaConfig::from_toml_str("[retry\nmax_retries = ").unwrap_err();
    assert!(matches!(err.kind(), FabulaErrorKind::Config(_)));
}

#[test]
fn test_explicit_file_wins() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[retry]\nretry_delay_ms = 250\n[pipeline]\noutput_root = \"/tmp/stories\"\n")?;

    let config = FabulaConfig::load(Some(&path))?;

    assert_eq!(*config.retry().retry_delay_ms(), 250);
    assert_eq!(config.pipeline().output_root().to_string_lossy(), "/tmp/stories");
    Ok(())
}

#[test]
fn test_missing_explicit_file_fails() {
    let missing = std::path::Path::new("/definitely/not/fabula.toml");
    assert!(FabulaConfig::load(Some(missing)).is_err());
}

#[test]
fn test_effective_config_round_trips() -> anyhow::Result<()> {
    let config = FabulaConfig::from_toml_str("[retry]\nmax_retries = 4")?;
    let rendered = config.to_toml()?;

    assert!(rendered.contains("max_retries = 4"));
    assert_eq!(FabulaConfig::from_toml_str(&rendered)?, config);
    Ok(())
}

#[test]
fn test_credentials_debug_hides_keys() {
    let credentials = Credentials::new("sk-secret").with_voice_engine_key("vk-secret");
    let shown = format!("{:?}", credentials);

    assert!(!shown.contains("sk-secret"));
    assert!(!shown.contains("vk-secret"));
    assert_eq!(credentials.generation_key(), "sk-secret");
    assert_eq!(credentials.voice_engine_key(), Some("vk-secret"));
}
