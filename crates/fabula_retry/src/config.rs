//! Retry discipline shared by every outbound call.
//!
//! Loaded from the `[retry]` table of `fabula.toml`:
//!
//! ```toml
//! [retry]
//! max_retries = 3       # total attempts, at least 1
//! retry_delay_ms = 2000 # fixed wait between attempts
//! timeout_secs = 30     # per-attempt timeout, greater than 0
//! ```

use derive_getters::Getters;
use fabula_error::{ConfigError, FabulaResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Retry and timeout settings applied to descriptors built by the executor.
///
/// # Example
///
/// ```
/// use fabula_retry::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default().with_max_retries(5);
/// assert_eq!(*config.max_retries(), 5);
/// assert_eq!(config.retry_delay(), Duration::from_secs(2));
/// assert!(config.validate().is_ok());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct RetryConfig {
    /// Total attempts per call
    #[serde(default = "default_max_retries")]
    max_retries: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    retry_delay_ms: u64,

    /// Per-attempt timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RetryConfig {
    /// Fixed delay between attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the executor's preconditions.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `max_retries` is zero or `timeout_secs`
    /// is zero.
    pub fn validate(&self) -> FabulaResult<()> {
        debug!(
            max_retries = self.max_retries,
            retry_delay_ms = self.retry_delay_ms,
            timeout_secs = self.timeout_secs,
            "Validating retry configuration"
        );
        if self.max_retries == 0 {
            return Err(ConfigError::invalid("retry.max_retries", "must be at least 1").into());
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("retry.timeout_secs", "must be greater than 0").into());
        }
        Ok(())
    }
}
