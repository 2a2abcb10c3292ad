//! Narration synthesis.

use crate::{ChatClient, ChatRequest, SpeechConfig};
use fabula_core::ChatMessage;
use fabula_error::{SynthesisError, SynthesisErrorKind};
use fabula_retry::{CallExecutor, ReqwestTransport, Transport};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// A narration file written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    /// Where the audio was written
    pub path: PathBuf,
    /// Language of the narration
    pub language: String,
    /// Size of the written file
    pub bytes: usize,
}

/// Turns narration text into speech files.
///
/// The primary language goes straight to the primary voice engine. Other
/// languages are translated with the chat model and spoken by the secondary
/// engine. Every remote call goes through the call executor.
pub struct AudioSynthesizer<T = ReqwestTransport> {
    executor: CallExecutor<T>,
    chat: ChatClient<T>,
    api_key: String,
    secondary_api_key: String,
    config: SpeechConfig,
}

impl<T> std::fmt::Debug for AudioSynthesizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSynthesizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> AudioSynthesizer<T> {
    /// Create a synthesizer using `api_key` for both voice engines.
    pub fn new(chat: ChatClient<T>, api_key: impl Into<String>, config: SpeechConfig) -> Self {
        let api_key = api_key.into();
        Self {
            executor: chat.executor().clone(),
            chat,
            secondary_api_key: api_key.clone(),
            api_key,
            config,
        }
    }

    /// Use a separate key for the secondary voice engine.
    pub fn with_secondary_key(mut self, key: impl Into<String>) -> Self {
        self.secondary_api_key = key.into();
        self
    }

    /// Voice settings.
    pub fn config(&self) -> &SpeechConfig {
        &self.config
    }

    /// Speak `text` in `language` and write the audio to `path`.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for blank text (no remote call is made), `Translation`
    /// when a non-primary language cannot be translated, `Remote` or
    /// `MalformedResponse` when the voice engine fails, `Write` when the file
    /// cannot be written.
    #[instrument(skip(self, text), fields(chars = text.chars().count(), path = %path.display()))]
    pub async fn synthesize(
        &self,
        text: &str,
        path: &Path,
        language: &str,
    ) -> Result<AudioArtifact, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::EmptyInput(
                "audio".to_string(),
            )));
        }

        let audio = if self.config.is_primary(language) {
            self.speak_primary(text).await?
        } else {
            let translated = self.translate(text, language).await?;
            self.speak_secondary(&translated, language).await?
        };

        if audio.is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::MalformedResponse(
                "voice engine returned no audio".to_string(),
            )));
        }

        write_artifact(path, &audio).await?;
        info!(bytes = audio.len(), "Audio saved");
        Ok(AudioArtifact {
            path: path.to_path_buf(),
            language: language.to_string(),
            bytes: audio.len(),
        })
    }

    async fn speak_primary(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let body = json!({
            "model": self.config.model(),
            "input": text,
            "voice": self.config.voice(),
            "response_format": self.config.response_format(),
            "sample_rate": self.config.sample_rate(),
            "stream": false,
            "speed": self.config.speed(),
            "gain": self.config.gain(),
        });
        self.speak(self.config.endpoint(), &self.api_key, body).await
    }

    async fn speak_secondary(&self, text: &str, language: &str) -> Result<Vec<u8>, SynthesisError> {
        let body = json!({
            "model": self.config.secondary_model(),
            "input": text,
            "voice": self.config.voice_for(language),
            "response_format": self.config.response_format(),
        });
        self.speak(self.config.secondary_endpoint(), &self.secondary_api_key, body)
            .await
    }

    async fn speak(&self, endpoint: &str, key: &str, body: Value) -> Result<Vec<u8>, SynthesisError> {
        let descriptor = self
            .executor
            .descriptor(endpoint)
            .bearer(key)
            .json(body)
            .build()
            .map_err(|e| remote(e.to_string()))?;

        let response = self
            .executor
            .execute_ok(&descriptor)
            .await
            .map_err(|e| remote(e.to_string()))?;
        Ok(response.into_bytes())
    }

    async fn translate(&self, text: &str, language: &str) -> Result<String, SynthesisError> {
        let failed = |message: String| {
            SynthesisError::new(SynthesisErrorKind::Translation {
                language: language.to_string(),
                message,
            })
        };

        let config = self.chat.config();
        let request = ChatRequest::builder()
            .messages(vec![
                ChatMessage::system(format!(
                    "Translate the user's story narration into the language with code '{}'. \
                     Keep the warm storytelling tone. Reply with the translation only.",
                    language
                )),
                ChatMessage::user(text),
            ])
            .temperature(*config.utility_temperature())
            .max_tokens(*config.utility_max_tokens())
            .build()
            .map_err(|e| failed(e.to_string()))?;

        let translated = self
            .chat
            .complete(&request)
            .await
            .map_err(|e| failed(e.to_string()))?;
        let translated = translated.trim();
        if translated.is_empty() {
            return Err(failed("empty translation".to_string()));
        }

        debug!(chars = translated.chars().count(), "Translated narration");
        Ok(translated.to_string())
    }
}

fn remote(message: String) -> SynthesisError {
    SynthesisError::new(SynthesisErrorKind::Remote(message))
}

pub(crate) async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), SynthesisError> {
    let write_failed = |message: String| {
        SynthesisError::new(SynthesisErrorKind::Write {
            path: path.display().to_string(),
            message,
        })
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| write_failed(e.to_string()))
}
