//! Endpoint and model settings for the generative clients.
//!
//! Each struct maps to one table of `fabula.toml` (`[chat]`, `[speech]`,
//! `[image]`). Every field has a default, so partial tables are fine.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SILICON_FLOW: &str = "https://api.siliconflow.com/v1";

/// Chat-completion settings shared by script, metadata, profile and
/// translation requests.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default, setter(into))]
#[serde(default)]
pub struct ChatConfig {
    /// OpenAI-compatible chat-completions endpoint
    endpoint: String,
    /// Model identifier
    model: String,
    /// Sampling temperature for story scripts
    script_temperature: f32,
    /// Token limit for story scripts
    script_max_tokens: u32,
    /// Sampling temperature for upload metadata
    metadata_temperature: f32,
    /// Token limit for upload metadata
    metadata_max_tokens: u32,
    /// Sampling temperature for language profiles and translations
    utility_temperature: f32,
    /// Token limit for language profiles and translations
    utility_max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("{}/chat/completions", SILICON_FLOW),
            model: "deepseek-ai/DeepSeek-V3".to_string(),
            script_temperature: 1.1,
            script_max_tokens: 4096,
            metadata_temperature: 0.7,
            metadata_max_tokens: 1024,
            utility_temperature: 0.3,
            utility_max_tokens: 1024,
        }
    }
}

/// Narration voice settings.
///
/// The primary language is spoken directly by the primary engine. Every
/// other language is translated first and then spoken by the secondary
/// engine, using the voice mapped to that language (or `secondary_voice`).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default, setter(into))]
#[serde(default)]
pub struct SpeechConfig {
    /// Language spoken by the primary engine without translation
    primary_language: String,
    /// Primary speech endpoint
    endpoint: String,
    /// Primary speech model
    model: String,
    /// Primary voice
    voice: String,
    /// Audio container requested from both engines
    response_format: String,
    /// Primary engine sample rate in Hz
    sample_rate: u32,
    /// Playback speed
    speed: f32,
    /// Output gain in dB
    gain: f32,
    /// Secondary engine endpoint (OpenAI-compatible `/audio/speech`)
    secondary_endpoint: String,
    /// Secondary engine model
    secondary_model: String,
    /// Voice used when a language has no entry in `secondary_voices`
    secondary_voice: String,
    /// Voice per language code
    secondary_voices: BTreeMap<String, String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            primary_language: "en".to_string(),
            endpoint: format!("{}/audio/speech", SILICON_FLOW),
            model: "fishaudio/fish-speech-1.5".to_string(),
            voice: "fishaudio/fish-speech-1.5:benjamin".to_string(),
            response_format: "mp3".to_string(),
            sample_rate: 32000,
            speed: 1.0,
            gain: 0.0,
            secondary_endpoint: "https://api.openai.com/v1/audio/speech".to_string(),
            secondary_model: "tts-1".to_string(),
            secondary_voice: "onyx".to_string(),
            secondary_voices: BTreeMap::new(),
        }
    }
}

impl SpeechConfig {
    /// True when `language` is spoken by the primary engine.
    pub fn is_primary(&self, language: &str) -> bool {
        self.primary_language.eq_ignore_ascii_case(language)
    }

    /// Secondary-engine voice for `language`.
    pub fn voice_for(&self, language: &str) -> &str {
        self.secondary_voices
            .get(language)
            .map(String::as_str)
            .unwrap_or(&self.secondary_voice)
    }
}

/// Illustration settings.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default, setter(into))]
#[serde(default)]
pub struct ImageConfig {
    /// Image generation endpoint
    endpoint: String,
    /// Image model
    model: String,
    /// Requested size, `WIDTHxHEIGHT`
    image_size: String,
    /// Diffusion steps
    steps: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("{}/images/generations", SILICON_FLOW),
            model: "black-forest-labs/FLUX.1-schnell".to_string(),
            image_size: "1024x576".to_string(),
            steps: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_voice_falls_back_to_default() {
        let config = SpeechConfig::default()
            .with_secondary_voices(BTreeMap::from([("te".to_string(), "nova".to_string())]));
        assert_eq!(config.voice_for("te"), "nova");
        assert_eq!(config.voice_for("hi"), "onyx");
    }

    #[test]
    fn primary_language_is_case_insensitive() {
        assert!(SpeechConfig::default().is_primary("EN"));
        assert!(!SpeechConfig::default().is_primary("te"));
    }
}
