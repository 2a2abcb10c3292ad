//! OpenAI-compatible chat-completion client.

use crate::ChatConfig;
use derive_builder::Builder;
use derive_getters::Getters;
use fabula_core::ChatMessage;
use fabula_error::{FabulaResult, JsonError};
use fabula_retry::{CallExecutor, ReqwestTransport, Transport};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, instrument};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*").expect("Valid code fence regex"));

/// Remove Markdown code fences that models wrap around JSON replies.
///
/// # Examples
///
/// ```
/// use fabula_models::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
/// ```
pub fn strip_code_fences(content: &str) -> String {
    CODE_FENCE.replace_all(content, "").trim().to_string()
}

/// Parse a model reply as JSON after stripping code fences.
///
/// # Errors
///
/// Returns a `JsonError` carrying a preview of the reply when it does not
/// match `T`.
pub fn parse_json_reply<T: DeserializeOwned>(content: &str) -> FabulaResult<T> {
    let cleaned = strip_code_fences(content);
    serde_json::from_str(&cleaned).map_err(|e| {
        JsonError::new(format!(
            "Model reply is not the expected JSON ({}): {}",
            e,
            fabula_core::body_preview(&cleaned, fabula_core::BODY_PREVIEW_CHARS)
        ))
        .into()
    })
}

/// One chat-completion request.
#[derive(Debug, Clone, PartialEq, Getters, Builder)]
#[builder(setter(into))]
pub struct ChatRequest {
    /// Conversation, system prompt first
    messages: Vec<ChatMessage>,
    /// Sampling temperature
    temperature: f32,
    /// Completion token limit
    max_tokens: u32,
    /// Ask for a JSON object reply
    #[builder(default)]
    json_mode: bool,
}

impl ChatRequest {
    /// Creates a new builder for `ChatRequest`.
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct CompletionReply {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: String,
}

/// Chat-completion client routed through the call executor.
pub struct ChatClient<T = ReqwestTransport> {
    executor: CallExecutor<T>,
    api_key: String,
    config: ChatConfig,
}

impl<T> Clone for ChatClient<T> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            api_key: self.api_key.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ChatClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", self.config.endpoint())
            .field("model", self.config.model())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ChatClient<T> {
    /// Creates a client with an explicit API key.
    pub fn new(executor: CallExecutor<T>, api_key: impl Into<String>, config: ChatConfig) -> Self {
        Self {
            executor,
            api_key: api_key.into(),
            config,
        }
    }

    /// Endpoint and sampling settings.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Executor used for every call.
    pub fn executor(&self) -> &CallExecutor<T> {
        &self.executor
    }

    /// Send `request` and return the first choice's content.
    ///
    /// # Errors
    ///
    /// Returns an `HttpError` when the call fails definitively and a
    /// `JsonError` when the reply has no choices.
    #[instrument(
        skip_all,
        fields(
            model = %self.config.model(),
            messages = request.messages().len(),
            json_mode = *request.json_mode()
        )
    )]
    pub async fn complete(&self, request: &ChatRequest) -> FabulaResult<String> {
        let body = CompletionBody {
            model: self.config.model(),
            messages: request.messages(),
            temperature: *request.temperature(),
            max_tokens: *request.max_tokens(),
            response_format: request
                .json_mode()
                .then_some(ResponseFormat { kind: "json_object" }),
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| JsonError::new(format!("Failed to encode chat request: {}", e)))?;

        let descriptor = self
            .executor
            .descriptor(self.config.endpoint())
            .bearer(&self.api_key)
            .json(body)
            .build()?;

        let response = self.executor.execute_ok(&descriptor).await?;
        let reply: CompletionReply = response.json()?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| JsonError::new("Chat reply contained no choices"))?;

        debug!(chars = content.len(), "Received chat completion");
        Ok(content)
    }

    /// Send `request` and decode the reply as `R`.
    ///
    /// # Errors
    ///
    /// As [`complete`](Self::complete), plus a `JsonError` when the reply does
    /// not decode.
    pub async fn complete_json<R: DeserializeOwned>(&self, request: &ChatRequest) -> FabulaResult<R> {
        let content = self.complete(request).await?;
        parse_json_reply(&content)
    }
}
