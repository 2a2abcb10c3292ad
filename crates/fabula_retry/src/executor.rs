//! Resilient call executor.
//!
//! Every outbound call in fabula goes through [`CallExecutor::execute`], which
//! applies one uniform policy:
//!
//! - 2xx/3xx: success, returned on the first attempt that achieves it
//! - 4xx: the request itself is wrong; stop immediately
//! - 5xx, timeouts, connection failures: transient; retry after a fixed delay
//! - anything else: unclassified; stop immediately
//!
//! At most `max_retries` attempts are made in total.

use crate::{ReqwestTransport, RetryConfig, Transport, TransportFailure};
use fabula_core::{
    BODY_PREVIEW_CHARS, NetworkFailureKind, Outcome, RemoteResponse, RequestDescriptor,
    RequestDescriptorBuilder, body_preview,
};
use fabula_error::FabulaResult;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};
use tracing::{error, info, instrument, warn};

/// Classify the result of one attempt.
///
/// # Examples
///
/// ```
/// use fabula_core::{NetworkFailureKind, Outcome, RemoteResponse};
/// use fabula_retry::{TransportFailure, classify};
///
/// assert!(classify(Ok(RemoteResponse::with_body(204, ""))).is_success());
/// assert!(classify(Ok(RemoteResponse::with_body(302, ""))).is_success());
/// assert_eq!(
///     classify(Ok(RemoteResponse::with_body(404, "missing"))),
///     Outcome::ClientError { status: 404, body: "missing".into() }
/// );
/// assert_eq!(
///     classify(Ok(RemoteResponse::with_body(502, ""))),
///     Outcome::ServerError { status: 502 }
/// );
/// assert_eq!(
///     classify(Err(TransportFailure::Timeout)),
///     Outcome::NetworkFailure(NetworkFailureKind::Timeout)
/// );
/// ```
pub fn classify(result: Result<RemoteResponse, TransportFailure>) -> Outcome {
    match result {
        Ok(response) => match response.status() {
            200..=399 => Outcome::Success(response),
            status @ 400..=499 => Outcome::ClientError {
                status,
                body: response.text(),
            },
            status @ 500.. => Outcome::ServerError { status },
            status => Outcome::Unexpected(format!("unexpected HTTP status {}", status)),
        },
        Err(TransportFailure::Timeout) => Outcome::NetworkFailure(NetworkFailureKind::Timeout),
        Err(TransportFailure::Connect(_)) => Outcome::NetworkFailure(NetworkFailureKind::Connect),
        Err(TransportFailure::Disconnected(_)) => {
            Outcome::NetworkFailure(NetworkFailureKind::Disconnected)
        }
        Err(TransportFailure::Other(message)) => Outcome::Unexpected(message),
    }
}

/// Retries transient failures of remote calls with a fixed delay.
///
/// The executor is stateless between calls; cloning shares the transport.
///
/// # Example
///
/// ```rust,ignore
/// use fabula_retry::{CallExecutor, RetryConfig};
/// use serde_json::json;
///
/// let executor = CallExecutor::from_config(&RetryConfig::default())?;
/// let descriptor = executor
///     .descriptor("https://api.siliconflow.com/v1/chat/completions")
///     .bearer(api_key)
///     .json(json!({"model": "deepseek-ai/DeepSeek-V3", "messages": []}))
///     .build()?;
///
/// match executor.execute(&descriptor).await {
///     Outcome::Success(response) => println!("{}", response.text()),
///     failure => eprintln!("{failure}"),
/// }
/// ```
pub struct CallExecutor<T = ReqwestTransport> {
    transport: Arc<T>,
    config: RetryConfig,
}

impl<T> Clone for CallExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T> std::fmt::Debug for CallExecutor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CallExecutor<ReqwestTransport> {
    /// Create an executor over a default `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the HTTP client cannot be
    /// built.
    pub fn from_config(config: &RetryConfig) -> FabulaResult<Self> {
        config.validate()?;
        Ok(Self::with_transport(ReqwestTransport::new()?, config.clone()))
    }
}

impl<T: Transport> CallExecutor<T> {
    /// Create an executor over any transport.
    pub fn with_transport(transport: T, config: RetryConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
        }
    }

    /// Create an executor sharing an existing transport.
    pub fn with_shared_transport(transport: Arc<T>, config: RetryConfig) -> Self {
        Self { transport, config }
    }

    /// The transport used for attempts.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Retry settings used to pre-fill descriptors.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Start a descriptor for `url` carrying the configured timeout, attempt
    /// count and delay.
    pub fn descriptor(&self, url: impl Into<String>) -> RequestDescriptorBuilder {
        let mut builder = RequestDescriptor::builder();
        builder
            .url(url)
            .timeout(self.config.timeout())
            .max_retries(*self.config.max_retries())
            .retry_delay(self.config.retry_delay());
        builder
    }

    /// Perform `descriptor`, retrying transient failures.
    ///
    /// Never panics and never returns an error: every condition is reported
    /// through the returned [`Outcome`], which is one of `Success`,
    /// `ClientError`, `Unexpected` or `ExhaustedRetries`.
    #[instrument(
        skip_all,
        fields(
            method = %descriptor.method(),
            url = %descriptor.url(),
            max_retries = *descriptor.max_retries()
        )
    )]
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Outcome {
        let max_retries = (*descriptor.max_retries()).max(1);
        let attempts = AtomicU32::new(0);
        let strategy =
            FixedInterval::new(*descriptor.retry_delay()).take(max_retries as usize - 1);

        let result = Retry::spawn(strategy, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if attempt > 1 {
                    info!(attempt, max_retries, "Retrying remote call");
                }
                match classify(self.transport.send(descriptor).await) {
                    Outcome::Success(response) => Ok(response),
                    outcome if outcome.is_retryable() => {
                        warn!(attempt, max_retries, outcome = %outcome, "Transient failure");
                        Err(RetryError::Transient {
                            err: outcome,
                            retry_after: None,
                        })
                    }
                    outcome => Err(RetryError::Permanent(outcome)),
                }
            }
        })
        .await;

        let attempts = attempts.load(Ordering::SeqCst);
        match result {
            Ok(response) => Outcome::Success(response),
            Err(last) if last.is_retryable() => {
                error!(attempts, last = %last, "Remote call failed after all attempts");
                Outcome::ExhaustedRetries {
                    attempts,
                    last: Box::new(last),
                }
            }
            Err(Outcome::ClientError { status, body }) => {
                error!(
                    status,
                    body = %body_preview(&body, BODY_PREVIEW_CHARS),
                    "Remote call rejected, not retrying"
                );
                Outcome::ClientError { status, body }
            }
            Err(other) => {
                error!(outcome = %other, "Unexpected remote call failure, not retrying");
                other
            }
        }
    }

    /// Perform `descriptor` and convert the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` (with status when known) for every non-success
    /// outcome.
    pub async fn execute_ok(&self, descriptor: &RequestDescriptor) -> FabulaResult<RemoteResponse> {
        self.execute(descriptor).await.into_result()
    }
}
