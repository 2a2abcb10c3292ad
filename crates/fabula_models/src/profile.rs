//! Remote language profile resolution.

use crate::{ChatClient, ChatRequest};
use async_trait::async_trait;
use fabula_cache::ProfileResolver;
use fabula_core::{ChatMessage, LanguageProfile};
use fabula_error::{FabulaResult, JsonError};
use fabula_retry::{ReqwestTransport, Transport};
use tracing::instrument;

/// Asks the chat model for culturally appropriate localization hints.
#[derive(Debug, Clone)]
pub struct RemoteProfileResolver<T = ReqwestTransport> {
    chat: ChatClient<T>,
}

impl<T: Transport> RemoteProfileResolver<T> {
    /// Create a resolver over `chat`.
    pub fn new(chat: ChatClient<T>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl<T: Transport> ProfileResolver for RemoteProfileResolver<T> {
    #[instrument(skip(self))]
    async fn resolve(&self, code: &str) -> FabulaResult<LanguageProfile> {
        let config = self.chat.config();
        let request = ChatRequest::builder()
            .messages(vec![
                ChatMessage::system(PROFILE_PROMPT),
                ChatMessage::user(format!("Language code: {}", code)),
            ])
            .temperature(*config.utility_temperature())
            .max_tokens(*config.utility_max_tokens())
            .json_mode(true)
            .build()
            .map_err(|e| JsonError::new(format!("Invalid profile request: {}", e)))?;

        self.chat.complete_json(&request).await
    }
}

const PROFILE_PROMPT: &str = r#"You localize YouTube metadata for Bible story videos.

Given an ISO language code, describe how to market a Bible story video to speakers of that language.

Reply with strict JSON only:
{
  "language_name": "English name of the language",
  "audience": "who watches, e.g. Telugu-speaking Christian families",
  "bible_phrase": "the phrase for 'Bible Story' in that language, which every title must contain",
  "cta": "a short subscribe call to action in that language",
  "tags_hint": "how to mix native-script, transliterated and English tags"
}"#;
