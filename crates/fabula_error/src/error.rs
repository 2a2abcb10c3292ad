//! Top-level error wrapper types.

use crate::{
    ConfigError, HttpError, IoError, JsonError, MediaError, PipelineError, SynthesisError,
    UploadError,
};

/// Every error condition the fabula crates can surface.
///
/// # Examples
///
/// ```
/// use fabula_error::{FabulaError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: FabulaError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FabulaErrorKind {
    /// Definitive remote-call failure
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Filesystem error
    #[from(IoError)]
    Io(IoError),
    /// Audio or image synthesis error
    #[from(SynthesisError)]
    Synthesis(SynthesisError),
    /// ffmpeg/ffprobe error
    #[from(MediaError)]
    Media(MediaError),
    /// Upload error
    #[from(UploadError)]
    Upload(UploadError),
    /// Pipeline abort
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Fabula error with kind discrimination.
///
/// # Examples
///
/// ```
/// use fabula_error::{FabulaErrorKind, FabulaResult, ConfigError};
///
/// fn might_fail() -> FabulaResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), FabulaErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Fabula Error: {}", _0)]
pub struct FabulaError(Box<FabulaErrorKind>);

impl FabulaError {
    /// Create a new error from a kind.
    pub fn new(kind: FabulaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FabulaErrorKind {
        &self.0
    }

    /// Response status of the failed remote call, if this is an HTTP error
    /// that carried one.
    pub fn http_status(&self) -> Option<u16> {
        match self.kind() {
            FabulaErrorKind::Http(e) => e.status,
            _ => None,
        }
    }
}

impl<T> From<T> for FabulaError
where
    T: Into<FabulaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for fabula operations.
///
/// # Examples
///
/// ```
/// use fabula_error::{FabulaResult, HttpError};
///
/// fn fetch_data() -> FabulaResult<String> {
///     Err(HttpError::with_status(404, "Not Found"))?
/// }
///
/// assert_eq!(fetch_data().unwrap_err().http_status(), Some(404));
/// ```
pub type FabulaResult<T> = std::result::Result<T, FabulaError>;
