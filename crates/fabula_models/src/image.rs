//! Scene illustration.

use crate::audio::write_artifact;
use crate::ImageConfig;
use fabula_core::Method;
use fabula_error::{SynthesisError, SynthesisErrorKind};
use fabula_retry::{CallExecutor, ReqwestTransport, Transport};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Style appended to every illustration prompt.
pub const IMAGE_STYLE: &str = "Style: Hand-drawn 2D animation, cel shaded, epic cinematic lighting, \
     matte painting background, 4k resolution, masterpiece, intricate details. \
     NO 3D, NO photorealism.";

/// Compose the prompt for one scene.
///
/// # Examples
///
/// ```
/// use fabula_models::build_image_prompt;
///
/// let prompt = build_image_prompt("Wide shot of a boy in a well", "a young shepherd");
/// assert!(prompt.starts_with("Wide shot of a boy in a well. Subject is a young shepherd. Style:"));
/// ```
pub fn build_image_prompt(action: &str, anchor: &str) -> String {
    format!("{}. Subject is {}. {}", action.trim_end_matches('.'), anchor, IMAGE_STYLE)
}

/// Seed shared by every illustration of one story, in `1..=999_999`.
pub fn story_seed() -> u64 {
    rand::thread_rng().gen_range(1..=999_999)
}

/// An illustration written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    /// Where the image was written
    pub path: PathBuf,
    /// Seed used for generation
    pub seed: u64,
    /// Size of the written file
    pub bytes: usize,
}

#[derive(Deserialize)]
struct GenerationReply {
    #[serde(default, alias = "images")]
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: String,
}

/// Generates scene illustrations and downloads them.
pub struct ImageSynthesizer<T = ReqwestTransport> {
    executor: CallExecutor<T>,
    api_key: String,
    config: ImageConfig,
}

impl<T> std::fmt::Debug for ImageSynthesizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSynthesizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ImageSynthesizer<T> {
    /// Create a synthesizer.
    pub fn new(executor: CallExecutor<T>, api_key: impl Into<String>, config: ImageConfig) -> Self {
        Self {
            executor,
            api_key: api_key.into(),
            config,
        }
    }

    /// Image settings.
    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Generate an image for `prompt` with `seed` and write it to `path`.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for a blank prompt, `Remote` when either the generation
    /// or the download fails, `MalformedResponse` when the reply has no image
    /// URL, `Write` when the file cannot be written.
    #[instrument(skip(self, prompt), fields(path = %path.display()))]
    pub async fn synthesize(
        &self,
        prompt: &str,
        path: &Path,
        seed: u64,
    ) -> Result<ImageArtifact, SynthesisError> {
        if prompt.trim().is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::EmptyInput(
                "image".to_string(),
            )));
        }

        let remote = |message: String| SynthesisError::new(SynthesisErrorKind::Remote(message));

        let generation = self
            .executor
            .descriptor(self.config.endpoint())
            .bearer(&self.api_key)
            .json(json!({
                "model": self.config.model(),
                "prompt": prompt,
                "image_size": self.config.image_size(),
                "num_inference_steps": self.config.steps(),
                "seed": seed,
            }))
            .build()
            .map_err(|e| remote(e.to_string()))?;

        let reply: GenerationReply = self
            .executor
            .execute_ok(&generation)
            .await
            .and_then(|response| response.json())
            .map_err(|e| remote(e.to_string()))?;

        let url = reply
            .data
            .into_iter()
            .next()
            .map(|image| image.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                SynthesisError::new(SynthesisErrorKind::MalformedResponse(
                    "image reply contained no URL".to_string(),
                ))
            })?;

        let download = self
            .executor
            .descriptor(url)
            .method(Method::Get)
            .build()
            .map_err(|e| remote(e.to_string()))?;
        let image = self
            .executor
            .execute_ok(&download)
            .await
            .map_err(|e| remote(e.to_string()))?
            .into_bytes();

        if image.is_empty() {
            return Err(SynthesisError::new(SynthesisErrorKind::MalformedResponse(
                "downloaded image is empty".to_string(),
            )));
        }

        write_artifact(path, &image).await?;
        info!(bytes = image.len(), seed, "Image saved");
        Ok(ImageArtifact {
            path: path.to_path_buf(),
            seed,
            bytes: image.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_does_not_double_periods() {
        let prompt = build_image_prompt("Close up of Job praying.", "an old man");
        assert!(prompt.starts_with("Close up of Job praying. Subject is an old man."));
        assert!(prompt.ends_with("NO 3D, NO photorealism."));
    }

    #[test]
    fn seed_in_range() {
        for _ in 0..1000 {
            let seed = story_seed();
            assert!((1..=999_999).contains(&seed));
        }
    }
}
