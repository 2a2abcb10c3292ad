//! Single-attempt transports.
//!
//! A `Transport` performs exactly one HTTP exchange and reports either the
//! raw response (whatever its status) or the way the exchange failed. Status
//! classification and retries belong to the executor.

use async_trait::async_trait;
use fabula_core::{Payload, RemoteResponse, RequestDescriptor};
use fabula_error::{FabulaResult, HttpError};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::io::ErrorKind;
use tracing::{debug, instrument, trace};

/// How a single exchange failed before producing a response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportFailure {
    /// The attempt exceeded its timeout
    #[display("request timed out")]
    Timeout,
    /// The connection could not be established
    #[display("connection failed: {}", _0)]
    Connect(String),
    /// The peer closed or reset the connection mid-exchange
    #[display("connection dropped: {}", _0)]
    Disconnected(String),
    /// Anything else: malformed response, local builder error, ...
    #[display("{}", _0)]
    Other(String),
}

/// One-shot HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one attempt of `descriptor`.
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<RemoteResponse, TransportFailure>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client (redirects followed).
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> FabulaResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create a transport that hands 3xx responses back untouched.
    ///
    /// Needed for resumable uploads, where `308 Resume Incomplete` is a
    /// progress report rather than a redirect.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn without_redirects() -> FabulaResult<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %descriptor.method(), url = %descriptor.url()))]
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<RemoteResponse, TransportFailure> {
        let method = reqwest::Method::from_bytes(descriptor.method().to_string().as_bytes())
            .map_err(|e| TransportFailure::Other(format!("invalid method: {}", e)))?;

        let mut request = self
            .client
            .request(method, descriptor.url())
            .timeout(*descriptor.timeout());

        for (name, value) in descriptor.headers() {
            request = request.header(name, value);
        }

        request = match descriptor.payload() {
            Some(Payload::Json(value)) if descriptor.method().sends_body() => request.json(value),
            Some(Payload::Binary {
                bytes,
                content_type,
            }) if descriptor.method().sends_body() => request
                .header(CONTENT_TYPE, content_type)
                .body(bytes.clone()),
            Some(Payload::Binary { .. }) => {
                return Err(TransportFailure::Other(format!(
                    "binary payload on read verb {}",
                    descriptor.method()
                )));
            }
            Some(payload) => request.query(&payload.query_pairs()),
            None => request,
        };

        let response = request.send().await.map_err(failure_from)?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        trace!(status, header_count = headers.len(), "Received response headers");

        let body = response.bytes().await.map_err(failure_from)?;
        debug!(status, body_len = body.len(), "Received response");

        Ok(RemoteResponse::new(status, headers, body.to_vec()))
    }
}

fn failure_from(error: reqwest::Error) -> TransportFailure {
    let message = describe(&error);
    if error.is_timeout() {
        TransportFailure::Timeout
    } else if error.is_connect() {
        TransportFailure::Connect(message)
    } else if (error.is_request() || error.is_body()) && connection_dropped(&error) {
        TransportFailure::Disconnected(message)
    } else {
        TransportFailure::Other(message)
    }
}

fn causes<'a>(error: &'a reqwest::Error) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(error.source(), |&cause| cause.source())
}

/// `reqwest` error text followed by every underlying cause.
fn describe(error: &reqwest::Error) -> String {
    causes(error).fold(error.to_string(), |mut message, cause| {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        message
    })
}

/// Whether the server closed or reset an established connection.
fn connection_dropped(error: &reqwest::Error) -> bool {
    causes(error).any(|cause| {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
            )
        } else if let Some(hyper) = cause.downcast_ref::<hyper::Error>() {
            hyper.is_incomplete_message() || hyper.is_closed() || hyper.is_canceled()
        } else {
            false
        }
    })
}
