//! Audio and image synthesis error types.
//!
//! Synthesizers report a typed reason instead of a bare boolean so the
//! pipeline can tell "substitute a placeholder" apart from "abort".

/// Why a synthesis step did not produce an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SynthesisErrorKind {
    /// Nothing to synthesize
    #[display("Empty input for {} synthesis", _0)]
    EmptyInput(String),
    /// Translation of the narration failed
    #[display("Translation to '{}' failed: {}", language, message)]
    Translation {
        /// Target language code
        language: String,
        /// Underlying failure
        message: String,
    },
    /// The remote service rejected or never completed the request
    #[display("Remote synthesis failed: {}", _0)]
    Remote(String),
    /// The service answered but the payload was unusable
    #[display("Malformed synthesis response: {}", _0)]
    MalformedResponse(String),
    /// Writing the artifact to disk failed
    #[display("Failed to write artifact {}: {}", path, message)]
    Write {
        /// Destination path
        path: String,
        /// Underlying failure
        message: String,
    },
}

impl SynthesisErrorKind {
    /// True when the failure came from the remote side and a placeholder is
    /// an acceptable substitute.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SynthesisErrorKind::Write { .. })
    }
}

/// Synthesis error with source location tracking.
///
/// # Examples
///
/// ```
/// use fabula_error::{SynthesisError, SynthesisErrorKind};
///
/// let err = SynthesisError::new(SynthesisErrorKind::Remote("HTTP 503".into()));
/// assert!(err.kind.is_recoverable());
/// assert!(format!("{}", err).contains("HTTP 503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Synthesis Error: {} at line {} in {}", kind, line, file)]
pub struct SynthesisError {
    /// The kind of error that occurred
    pub kind: SynthesisErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SynthesisError {
    /// Create a new SynthesisError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SynthesisErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
