//! Media tool (ffmpeg/ffprobe) error types.

/// Failure of an external media tool invocation.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} failed: {} at line {} in {}", tool, message, line, file)]
pub struct MediaError {
    /// Tool that failed (e.g. "ffmpeg")
    pub tool: String,
    /// Error message or captured stderr tail
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl MediaError {
    /// Create a new MediaError at the current location.
    #[track_caller]
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            tool: tool.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
