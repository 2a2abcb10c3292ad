//! Story script generation.

use crate::{ChatClient, ChatRequest};
use fabula_core::{ChatMessage, Script};
use fabula_error::{FabulaResult, PipelineError, PipelineErrorKind};
use fabula_retry::{ReqwestTransport, Transport};
use tracing::{info, instrument};

/// Writes scene-structured scripts with narration in every requested language.
#[derive(Debug, Clone)]
pub struct ScriptGenerator<T = ReqwestTransport> {
    chat: ChatClient<T>,
}

impl<T: Transport> ScriptGenerator<T> {
    /// Create a generator over `chat`.
    pub fn new(chat: ChatClient<T>) -> Self {
        Self { chat }
    }

    /// Generate the script for `topic`.
    ///
    /// # Errors
    ///
    /// Fails when the chat call fails, when the reply is not a script, or
    /// when the script has no segments at all.
    #[instrument(skip(self), fields(languages = languages.len()))]
    pub async fn generate(&self, topic: &str, languages: &[String]) -> FabulaResult<Script> {
        let config = self.chat.config();
        let request = ChatRequest::builder()
            .messages(vec![
                ChatMessage::system(script_prompt(topic, languages)),
                ChatMessage::user(format!("Write the script for: {}", topic)),
            ])
            .temperature(*config.script_temperature())
            .max_tokens(*config.script_max_tokens())
            .json_mode(true)
            .build()
            .map_err(|e| PipelineError::new(PipelineErrorKind::ScriptUnavailable(e.to_string())))?;

        let script: Script = self.chat.complete_json(&request).await?;
        if script.segments().is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyScript).into());
        }

        info!(
            scenes = script.scenes.len(),
            segments = script.segments().len(),
            "Generated story script"
        );
        Ok(script)
    }
}

/// System prompt asking for narration keyed by each language code.
pub fn script_prompt(topic: &str, languages: &[String]) -> String {
    let codes = languages
        .iter()
        .map(|code| format!("\"{}\"", code))
        .collect::<Vec<_>>()
        .join(", ");
    let narration_example = languages
        .iter()
        .map(|code| format!("\"{}\": \"...\"", code))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are an animation director and a warm, grandfatherly storyteller.

Write an emotional, visually consistent children's animation script about "{topic}".

Scenes:
- Start a new scene whenever the picture must change (a character moves, someone new arrives, the mood turns).
- Keep each narration to 3-4 sentences; split longer passages into two scenes with different camera framing.
- Give the story a clear beginning, middle and end, with spoken dialogue where it fits.

Narration:
- Provide the narration of every scene in each of these language codes: {codes}.
- Each language must read naturally for a native speaker; do not transliterate.

Visuals:
- Describe only physical actions and camera framing, never abstract qualities.
- Begin every visual_action with the shot type ("Wide shot of...", "Close up of...").
- The visual must show the exact moment the narration describes.

Reply with strict JSON only:
{{
  "character_anchor": "fixed physical description of the main character",
  "scenes": [{{"narration": {{{narration_example}}}, "visual_action": "..."}}],
  "lesson": {{"narration": {{{narration_example}}}, "visual_action": "symbolic image"}},
  "blessing": {{"narration": {{{narration_example}}}, "visual_action": "peaceful image"}}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_every_language() {
        let prompt = script_prompt("Joseph's coat", &["en".to_string(), "te".to_string()]);
        assert!(prompt.contains("\"en\", \"te\""));
        assert!(prompt.contains("\"te\": \"...\""));
        assert!(prompt.contains("Joseph's coat"));
    }
}
