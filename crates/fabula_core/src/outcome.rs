//! Outcome of a resilient remote call.

use crate::RemoteResponse;
use fabula_error::{FabulaResult, HttpError};
use std::fmt;

/// Longest response-body excerpt kept in logs and error messages.
pub const BODY_PREVIEW_CHARS: usize = 200;

/// Truncate a response body for diagnostics, respecting char boundaries.
///
/// # Examples
///
/// ```
/// use fabula_core::body_preview;
///
/// assert_eq!(body_preview("short", 10), "short");
/// assert_eq!(body_preview("abcdefghij", 4), "abcd…");
/// ```
pub fn body_preview(body: &str, max_chars: usize) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Transport-level failures that are worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum NetworkFailureKind {
    /// The attempt exceeded its timeout
    #[display("timeout")]
    Timeout,
    /// The connection could not be established
    #[display("connection failure")]
    Connect,
    /// The connection was closed or reset after it was established
    #[display("connection dropped")]
    Disconnected,
}

/// Result contract of the call executor.
///
/// `ServerError` and `NetworkFailure` describe a single failed attempt; the
/// executor only hands them back wrapped in `ExhaustedRetries`. The other
/// variants are final.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx/3xx response
    Success(RemoteResponse),
    /// 4xx response; never retried
    ClientError {
        /// Response status
        status: u16,
        /// Response body
        body: String,
    },
    /// 5xx response; retryable
    ServerError {
        /// Response status
        status: u16,
    },
    /// Timeout or connection failure; retryable
    NetworkFailure(NetworkFailureKind),
    /// Every allowed attempt failed with a retryable condition
    ExhaustedRetries {
        /// Attempts made
        attempts: u32,
        /// Failure of the final attempt
        last: Box<Outcome>,
    },
    /// Unclassified failure; never retried
    Unexpected(String),
}

impl Outcome {
    /// True for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// True for conditions the executor will retry.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_core::{NetworkFailureKind, Outcome};
    ///
    /// assert!(Outcome::ServerError { status: 503 }.is_retryable());
    /// assert!(Outcome::NetworkFailure(NetworkFailureKind::Timeout).is_retryable());
    /// assert!(!Outcome::ClientError { status: 401, body: String::new() }.is_retryable());
    /// assert!(!Outcome::Unexpected("bad header".into()).is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Outcome::ServerError { .. } | Outcome::NetworkFailure(_))
    }

    /// Status code carried by this outcome, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Success(response) => Some(response.status()),
            Outcome::ClientError { status, .. } | Outcome::ServerError { status } => Some(*status),
            Outcome::ExhaustedRetries { last, .. } => last.status(),
            Outcome::NetworkFailure(_) | Outcome::Unexpected(_) => None,
        }
    }

    /// Borrow the response of a successful outcome.
    pub fn response(&self) -> Option<&RemoteResponse> {
        match self {
            Outcome::Success(response) => Some(response),
            _ => None,
        }
    }

    /// Convert into a `Result`, turning every failure into an `HttpError`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_core::Outcome;
    ///
    /// let err = Outcome::ClientError { status: 401, body: "bad key".into() }
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(err.http_status(), Some(401));
    /// ```
    #[track_caller]
    pub fn into_result(self) -> FabulaResult<RemoteResponse> {
        match self {
            Outcome::Success(response) => Ok(response),
            other => {
                let message = other.to_string();
                let error = match other.status() {
                    Some(status) => HttpError::with_status(status, message),
                    None => HttpError::new(message),
                };
                Err(error.into())
            }
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(response) => write!(f, "success (HTTP {})", response.status()),
            Outcome::ClientError { status, body } => write!(
                f,
                "client error (HTTP {}): {}",
                status,
                body_preview(body, BODY_PREVIEW_CHARS)
            ),
            Outcome::ServerError { status } => write!(f, "server error (HTTP {})", status),
            Outcome::NetworkFailure(kind) => write!(f, "network failure: {}", kind),
            Outcome::ExhaustedRetries { attempts, last } => {
                write!(f, "failed after {} attempts (last: {})", attempts, last)
            }
            Outcome::Unexpected(message) => write!(f, "unexpected error: {}", message),
        }
    }
}
