//! Pipeline driver error types.

/// Conditions that abort a production run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Topic is empty or whitespace
    #[display("Topic must not be empty")]
    EmptyTopic,
    /// No narration languages were requested
    #[display("At least one narration language is required")]
    NoLanguages,
    /// Topic cannot be used as a single folder name
    #[display("Topic cannot name an output folder: {:?}", _0)]
    InvalidTopic(String),
    /// Language code is not a plain code such as `en` or `pt-BR`
    #[display("Invalid language code: {:?}", _0)]
    InvalidLanguage(String),
    /// Script generation failed; nothing else is attempted
    #[display("Script generation failed: {}", _0)]
    ScriptUnavailable(String),
    /// The script came back without any scenes
    #[display("Script contains no scenes")]
    EmptyScript,
    /// Output folders could not be created
    #[display("Failed to prepare output folders: {}", _0)]
    Folders(String),
}

/// Pipeline error with source location tracking.
///
/// # Examples
///
/// ```
/// use fabula_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::EmptyScript);
/// assert!(format!("{}", err).contains("no scenes"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
