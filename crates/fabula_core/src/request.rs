//! Request descriptors for outbound remote calls.

use derive_builder::Builder;
use derive_getters::Getters;
use fabula_error::{ConfigError, FabulaErrorKind};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// HTTP verb of a remote call.
///
/// Write verbs carry the payload as the request body; read verbs flatten a
/// JSON object payload into query parameters.
///
/// # Examples
///
/// ```
/// use fabula_core::Method;
///
/// assert!(Method::Post.sends_body());
/// assert!(!Method::Get.sends_body());
/// assert_eq!(Method::Put.to_string(), "PUT");
/// assert_eq!("delete".parse::<Method>().unwrap(), Method::Delete);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    /// Read
    Get,
    /// Create / invoke (default)
    #[default]
    Post,
    /// Replace
    Put,
    /// Partial update
    Patch,
    /// Remove
    Delete,
}

impl Method {
    /// Whether the payload travels as the request body.
    pub fn sends_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

/// Body (or query) content of a remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON document
    Json(Value),
    /// Raw bytes with an explicit content type
    Binary {
        /// Body bytes
        bytes: Vec<u8>,
        /// MIME type sent as `Content-Type`
        content_type: String,
    },
}

impl Payload {
    /// Flatten a JSON object into `key=value` query pairs.
    ///
    /// Strings are used verbatim, `null` members are skipped, other values
    /// use their JSON text. Non-object payloads yield no pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabula_core::Payload;
    /// use serde_json::json;
    ///
    /// let payload = Payload::Json(json!({"q": "joseph", "limit": 5, "skip": null}));
    /// assert_eq!(
    ///     payload.query_pairs(),
    ///     vec![("limit".to_string(), "5".to_string()), ("q".to_string(), "joseph".to_string())]
    /// );
    /// ```
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match self {
            Payload::Json(Value::Object(map)) => map
                .iter()
                .filter_map(|(key, value)| match value {
                    Value::Null => None,
                    Value::String(s) => Some((key.clone(), s.clone())),
                    other => Some((key.clone(), other.to_string())),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Immutable description of one outbound call and its retry discipline.
///
/// Built fresh per call. `max_retries` counts total attempts and must be at
/// least 1; `timeout` applies to each attempt and must be non-zero.
///
/// # Examples
///
/// ```
/// use fabula_core::{Method, RequestDescriptor};
/// use serde_json::json;
/// use std::time::Duration;
///
/// let descriptor = RequestDescriptor::builder()
///     .url("https://api.example.com/v1/chat/completions")
///     .bearer("sk-test")
///     .json(json!({"model": "demo"}))
///     .build()
///     .unwrap();
///
/// assert_eq!(*descriptor.method(), Method::Post);
/// assert_eq!(*descriptor.max_retries(), 3);
/// assert_eq!(*descriptor.retry_delay(), Duration::from_secs(2));
/// assert_eq!(descriptor.headers()["Authorization"], "Bearer sk-test");
///
/// assert!(RequestDescriptor::builder().url("https://x").max_retries(0u32).build().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Getters, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct RequestDescriptor {
    /// Target endpoint
    #[builder(setter(into))]
    url: String,
    /// HTTP verb
    #[builder(default)]
    method: Method,
    /// Request headers
    #[builder(default, setter(custom))]
    headers: BTreeMap<String, String>,
    /// Optional body or query payload
    #[builder(default, setter(strip_option))]
    payload: Option<Payload>,
    /// Per-attempt timeout
    #[builder(default = "Duration::from_secs(30)")]
    timeout: Duration,
    /// Total attempts allowed
    #[builder(default = "3")]
    max_retries: u32,
    /// Fixed wait between attempts
    #[builder(default = "Duration::from_secs(2)")]
    retry_delay: Duration,
}

impl RequestDescriptor {
    /// Start building a descriptor.
    pub fn builder() -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::default()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl RequestDescriptorBuilder {
    /// Add (or replace) one header.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Add every header from an iterator of pairs.
    pub fn headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.header(name, value);
        }
        self
    }

    /// Set an `Authorization: Bearer` header.
    pub fn bearer(&mut self, token: impl AsRef<str>) -> &mut Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Set a JSON payload.
    pub fn json(&mut self, value: Value) -> &mut Self {
        self.payload = Some(Some(Payload::Json(value)));
        self
    }

    /// Set a raw binary payload.
    pub fn binary(&mut self, bytes: Vec<u8>, content_type: impl Into<String>) -> &mut Self {
        self.payload = Some(Some(Payload::Binary {
            bytes,
            content_type: content_type.into(),
        }));
        self
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(url) = &self.url
            && url.trim().is_empty()
        {
            return Err("url must not be empty".to_string());
        }
        if self.max_retries == Some(0) {
            return Err("max_retries must be at least 1".to_string());
        }
        if let Some(timeout) = &self.timeout
            && timeout.is_zero()
        {
            return Err("timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl From<RequestDescriptorBuilderError> for FabulaErrorKind {
    fn from(err: RequestDescriptorBuilderError) -> Self {
        ConfigError::new(format!("Invalid request descriptor: {}", err)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_zero_timeout() {
        let result = RequestDescriptor::builder()
            .url("https://api.example.com")
            .timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_blank_url() {
        assert!(RequestDescriptor::builder().url("  ").build().is_err());
        assert!(RequestDescriptor::builder().build().is_err());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let descriptor = RequestDescriptor::builder()
            .url("https://api.example.com")
            .header("Content-Type", "application/json")
            .build()
            .unwrap();
        assert_eq!(descriptor.header("content-type"), Some("application/json"));
        assert_eq!(descriptor.header("accept"), None);
    }

    #[test]
    fn later_payload_replaces_earlier() {
        let descriptor = RequestDescriptor::builder()
            .url("https://api.example.com")
            .json(json!({"a": 1}))
            .binary(vec![1, 2, 3], "video/mp4")
            .build()
            .unwrap();
        assert!(matches!(descriptor.payload(), Some(Payload::Binary { .. })));
    }

    #[test]
    fn non_object_payload_has_no_query_pairs() {
        assert!(Payload::Json(json!([1, 2])).query_pairs().is_empty());
        let binary = Payload::Binary {
            bytes: vec![0],
            content_type: "application/octet-stream".into(),
        };
        assert!(binary.query_pairs().is_empty());
    }
}
