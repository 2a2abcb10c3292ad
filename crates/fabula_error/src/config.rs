//! Configuration error types.

/// Configuration error with source location.
///
/// Raised while layering configuration files or when a loaded value
/// violates a constraint (for example `retry.max_retries = 0`).
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Offending configuration key, if the error concerns a single value
    pub key: Option<String>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_error::ConfigError;
    ///
    /// let err = ConfigError::new("Failed to parse fabula.toml");
    /// assert!(err.message.contains("fabula.toml"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            key: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a ConfigError for a specific invalid key.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_error::ConfigError;
    ///
    /// let err = ConfigError::invalid("retry.max_retries", "must be at least 1");
    /// assert_eq!(err.key.as_deref(), Some("retry.max_retries"));
    /// assert!(format!("{}", err).contains("retry.max_retries"));
    /// ```
    #[track_caller]
    pub fn invalid(key: impl Into<String>, reason: impl AsRef<str>) -> Self {
        let location = std::panic::Location::caller();
        let key = key.into();
        Self {
            message: format!("{} {}", key, reason.as_ref()),
            key: Some(key),
            line: location.line(),
            file: location.file(),
        }
    }
}
