//! Filesystem error types.

/// Filesystem error with the offending path and source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("IO Error: {} ({}) at line {} in {}", message, path, line, file)]
pub struct IoError {
    /// The underlying error message
    pub message: String,
    /// Path being read or written
    pub path: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl IoError {
    /// Create a new IoError for `path` at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_error::IoError;
    ///
    /// let err = IoError::new("/tmp/out/audio_0.mp3", "permission denied");
    /// assert!(format!("{}", err).contains("audio_0.mp3"));
    /// ```
    #[track_caller]
    pub fn new(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            path: path.as_ref().display().to_string(),
            line: location.line(),
            file: location.file(),
        }
    }
}
