//! Per-topic output folders.

use fabula_error::{FabulaResult, PipelineError, PipelineErrorKind};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Folder-safe form of a topic: spaces become `_`, apostrophes are dropped.
///
/// # Examples
///
/// ```
/// use fabula::safe_name;
///
/// assert_eq!(safe_name("Joseph's Coat"), "Josephs_Coat");
/// ```
pub fn safe_name(topic: &str) -> String {
    topic.replace(' ', "_").replace('\'', "")
}

/// Check that `code` is a plain language code: ASCII letters, digits, `-`
/// and `_` only.
///
/// # Examples
///
/// ```
/// use fabula::validate_language;
///
/// assert!(validate_language("pt-BR").is_ok());
/// assert!(validate_language("../te").is_err());
/// ```
///
/// # Errors
///
/// Returns a `PipelineError` (`InvalidLanguage`) otherwise.
pub fn validate_language(code: &str) -> FabulaResult<()> {
    let plain = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        Ok(())
    } else {
        Err(PipelineError::new(PipelineErrorKind::InvalidLanguage(code.to_string())).into())
    }
}

/// Topic folder name, provided it stays a single component under the root.
fn topic_folder(topic: &str) -> FabulaResult<String> {
    let name = safe_name(topic);
    let mut components = Path::new(&name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(PipelineError::new(PipelineErrorKind::InvalidTopic(topic.to_string())).into()),
    }
}

/// Paths of every artifact produced for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLayout {
    base: PathBuf,
}

impl OutputLayout {
    /// Layout rooted at `base`. Creates nothing.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Topic folder.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Folder of the shared illustrations.
    pub fn images_dir(&self) -> PathBuf {
        self.base.join("images")
    }

    /// Narration folder for `language`.
    pub fn audio_dir(&self, language: &str) -> PathBuf {
        self.base.join("audio").join(language)
    }

    /// Intermediate clips for `language`.
    pub fn clips_dir(&self, language: &str) -> PathBuf {
        self.base.join("clips").join(language)
    }

    /// Narration of segment `index` in `language`.
    pub fn audio_path(&self, language: &str, index: usize) -> PathBuf {
        self.audio_dir(language).join(format!("audio_{}.mp3", index))
    }

    /// Illustration of segment `index`.
    pub fn image_path(&self, index: usize) -> PathBuf {
        self.images_dir().join(format!("image_{}.png", index))
    }

    /// Finished video for `language`.
    pub fn final_video(&self, language: &str) -> PathBuf {
        self.base.join(format!("Final_Video_{}.mp4", language))
    }

    /// Pretty-printed metadata kept next to the narration.
    pub fn metadata_debug(&self, language: &str) -> PathBuf {
        self.audio_dir(language).join("meta_data_debug.txt")
    }
}

/// Create `<root>/<safe topic>/images` and `audio/<lang>` for each language.
///
/// Existing folders are reused. Nothing is created unless the topic and
/// every language code name folders inside `root`.
///
/// # Errors
///
/// Returns a `PipelineError`: `InvalidTopic` or `InvalidLanguage` for names
/// that would escape `root`, `Folders` when a directory cannot be created.
pub fn setup_folders(root: &Path, topic: &str, languages: &[String]) -> FabulaResult<OutputLayout> {
    let folder = topic_folder(topic)?;
    for language in languages {
        validate_language(language)?;
    }
    let layout = OutputLayout::new(root.join(folder));

    let create = |dir: PathBuf| {
        std::fs::create_dir_all(&dir).map_err(|e| {
            PipelineError::new(PipelineErrorKind::Folders(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })
    };

    create(layout.images_dir())?;
    for language in languages {
        create(layout.audio_dir(language))?;
    }

    info!(base = %layout.base().display(), "Created output folders");
    Ok(layout)
}
