//! Video upload error types.

/// Specific error conditions for the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum UploadErrorKind {
    /// Stored credential file is missing
    #[display("Token file not found at {}", _0)]
    MissingToken(String),
    /// Credential file exists but holds no usable token
    #[display("Token file {} has no access token", _0)]
    InvalidToken(String),
    /// The video to upload does not exist
    #[display("Video file not found at {}", _0)]
    MissingVideo(String),
    /// Upload session could not be opened
    #[display("Failed to start upload session: {}", _0)]
    SessionStart(String),
    /// A chunk transfer failed
    #[display("Chunk upload failed at byte {}: {}", offset, message)]
    Chunk {
        /// Byte offset of the failed chunk
        offset: u64,
        /// Underlying failure
        message: String,
    },
    /// Upload finished but the platform returned no video id
    #[display("Upload completed without a video id")]
    MissingVideoId,
}

/// Upload error with source location tracking.
///
/// # Examples
///
/// ```
/// use fabula_error::{UploadError, UploadErrorKind};
///
/// let err = UploadError::new(UploadErrorKind::MissingVideoId);
/// assert!(format!("{}", err).contains("video id"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upload Error: {} at line {} in {}", kind, line, file)]
pub struct UploadError {
    /// The kind of error that occurred
    pub kind: UploadErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UploadError {
    /// Create a new UploadError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: UploadErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
