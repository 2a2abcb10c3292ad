//! Generative model clients for fabula.
//!
//! Every client speaks to an OpenAI-compatible HTTP API and routes each call
//! through [`fabula_retry::CallExecutor`], so all of them share one retry
//! policy.
//!
//! - [`ScriptGenerator`]: scene-structured story script in several languages
//! - [`MetadataGenerator`]: localized upload metadata, using cached
//!   [`LanguageProfile`](fabula_core::LanguageProfile)s
//! - [`RemoteProfileResolver`]: fills the language profile cache
//! - [`AudioSynthesizer`]: narration audio, translating non-primary languages
//! - [`ImageSynthesizer`]: scene illustrations
//!
//! # Example
//!
//! ```no_run
//! use fabula_models::{ChatClient, ChatConfig, ScriptGenerator};
//! use fabula_retry::{CallExecutor, RetryConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = CallExecutor::from_config(&RetryConfig::default())?;
//! let chat = ChatClient::new(executor, std::env::var("SILICON_FLOW_API_KEY")?, ChatConfig::default());
//! let script = ScriptGenerator::new(chat)
//!     .generate("Joseph's coat", &["en".to_string()])
//!     .await?;
//! println!("{} segments", script.segments().len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod audio;
mod chat;
mod config;
mod image;
mod metadata;
mod profile;
mod script;

pub use audio::{AudioArtifact, AudioSynthesizer};
pub use chat::{ChatClient, ChatRequest, ChatRequestBuilder, parse_json_reply, strip_code_fences};
pub use config::{
    ChatConfig, ChatConfigBuilder, ImageConfig, ImageConfigBuilder, SpeechConfig,
    SpeechConfigBuilder,
};
pub use image::{IMAGE_STYLE, ImageArtifact, ImageSynthesizer, build_image_prompt, story_seed};
pub use metadata::{MetadataGenerator, metadata_prompt};
pub use profile::RemoteProfileResolver;
pub use script::{ScriptGenerator, script_prompt};
