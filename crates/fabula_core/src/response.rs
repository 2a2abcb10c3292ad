//! Raw responses returned by a successful remote call.

use fabula_error::{FabulaResult, JsonError};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Status, headers and body of one HTTP response.
///
/// The executor never interprets the body; decoding is left to the caller.
///
/// # Examples
///
/// ```
/// use fabula_core::RemoteResponse;
/// use std::collections::BTreeMap;
///
/// let mut headers = BTreeMap::new();
/// headers.insert("Location".to_string(), "https://upload/session/1".to_string());
/// let response = RemoteResponse::new(200, headers, br#"{"id":"abc"}"#.to_vec());
///
/// assert_eq!(response.header("location"), Some("https://upload/session/1"));
/// let value: serde_json::Value = response.json().unwrap();
/// assert_eq!(value["id"], "abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl RemoteResponse {
    /// Create a response. Header names are stored lowercased.
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Shorthand for a response without headers.
    pub fn with_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, BTreeMap::new(), body.into())
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// All headers, names lowercased.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consume the response, keeping only the body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns a `JsonError` when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> FabulaResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            JsonError::new(format!(
                "Failed to decode response body (HTTP {}): {}",
                self.status, e
            ))
            .into()
        })
    }
}
