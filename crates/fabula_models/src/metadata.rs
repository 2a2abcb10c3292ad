//! Upload metadata generation.

use crate::{ChatClient, ChatRequest};
use fabula_cache::{LanguageProfileCache, ProfileResolver};
use fabula_core::{ChatMessage, LanguageProfile, Script, VideoMetadata};
use fabula_error::{FabulaResult, JsonError};
use fabula_retry::{ReqwestTransport, Transport};
use std::sync::Arc;
use tracing::{info, instrument};

/// Scene narrations quoted to the model as a story preview.
const PREVIEW_SCENES: usize = 2;

/// Writes localized title, description, tags and category for one video.
pub struct MetadataGenerator<R, T = ReqwestTransport> {
    chat: ChatClient<T>,
    profiles: Arc<LanguageProfileCache<R>>,
}

impl<R, T> std::fmt::Debug for MetadataGenerator<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataGenerator")
            .field("chat", &self.chat)
            .field("profiles", &self.profiles)
            .finish()
    }
}

impl<R: ProfileResolver, T: Transport> MetadataGenerator<R, T> {
    /// Create a generator sharing `profiles` with the rest of the pipeline.
    pub fn new(chat: ChatClient<T>, profiles: Arc<LanguageProfileCache<R>>) -> Self {
        Self { chat, profiles }
    }

    /// Profile cache consulted for each language.
    pub fn profiles(&self) -> &Arc<LanguageProfileCache<R>> {
        &self.profiles
    }

    /// Generate metadata for the `language` video of `topic`.
    ///
    /// # Errors
    ///
    /// Fails when the chat call fails or the reply is not metadata. Profile
    /// lookup never fails.
    #[instrument(skip(self, script))]
    pub async fn generate(
        &self,
        topic: &str,
        script: &Script,
        language: &str,
    ) -> FabulaResult<VideoMetadata> {
        let profile = self.profiles.get_profile(language).await;

        let mut context = format!("Topic: {}", topic);
        let preview = script.preview(language, PREVIEW_SCENES);
        if !preview.is_empty() {
            context.push_str(&format!("\nStory preview: {}", preview));
        }

        let config = self.chat.config();
        let request = ChatRequest::builder()
            .messages(vec![
                ChatMessage::system(metadata_prompt(&profile)),
                ChatMessage::user(format!("Generate metadata for: {}", context)),
            ])
            .temperature(*config.metadata_temperature())
            .max_tokens(*config.metadata_max_tokens())
            .json_mode(true)
            .build()
            .map_err(|e| JsonError::new(format!("Invalid metadata request: {}", e)))?;

        let metadata: VideoMetadata = self.chat.complete_json(&request).await?;
        let metadata = metadata.normalized();
        info!(title = %metadata.title, tags = metadata.tags.len(), "Generated video metadata");
        Ok(metadata)
    }
}

/// System prompt for one language's metadata.
pub fn metadata_prompt(profile: &LanguageProfile) -> String {
    format!(
        r#"You are a YouTube growth strategist specializing in Christian content for {audience}.

Write high-reach metadata for an animated Bible story video in {language}.

Title:
- Catchy, emotional or mysterious, under 100 characters.
- Must contain "{phrase}" and the story's name.

Description:
- 3-4 passionate sentences summarizing the story, in {language}.
- End with: "{cta}"
- Add 5-10 strong hashtags.

Tags:
- 15-20 high-volume search keywords. {tags_hint}.

Category:
- "1" (Film & Animation), "22" (People & Blogs) or "27" (Education); pick the best reach.

Reply with strict JSON only:
{{"title": "...", "description": "...", "tags": ["..."], "category_id": "22"}}"#,
        audience = profile.audience,
        language = profile.language_name,
        phrase = profile.bible_phrase,
        cta = profile.cta,
        tags_hint = profile.tags_hint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_profile_hints() {
        let prompt = metadata_prompt(&LanguageProfile::fallback("ta"));
        assert!(prompt.contains("TA"));
        assert!(prompt.contains("\"Bible Story\""));
        assert!(prompt.contains("Subscribe for more stories!"));
        assert!(prompt.contains("Global Audience"));
    }
}
