//! Layered configuration for the whole pipeline.
//!
//! Sources, lowest precedence first:
//! 1. Bundled defaults (`include_str!` of the workspace `fabula.toml`)
//! 2. `~/.config/fabula/fabula.toml`
//! 3. `./fabula.toml`
//! 4. An explicit file passed with `--config`
//!
//! User files are optional and skipped when absent. API keys never live in
//! TOML; see [`Credentials`].

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use crate::LoggingConfig;
use fabula_error::{ConfigError, FabulaError, FabulaResult};
use fabula_models::{ChatConfig, ImageConfig, SpeechConfig};
use fabula_retry::RetryConfig;
use fabula_upload::UploadConfig;
use fabula_video::VideoConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../fabula.toml");

/// Environment variable holding the generation API key.
pub const GENERATION_KEY_VAR: &str = "SILICON_FLOW_API_KEY";

/// Environment variable holding the secondary voice engine key.
pub const VOICE_ENGINE_KEY_VAR: &str = "VOICE_ENGINE_API_KEY";

/// Where runs are written and which languages are narrated by default.
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
pub struct PipelineConfig {
    /// Root under which each topic gets its own folder
    output_root: PathBuf,
    /// Narration languages used when none are given on the command line
    languages: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("Output"),
            languages: vec!["en".to_string()],
        }
    }
}

/// Top-level fabula configuration.
///
/// # Example
///
/// ```no_run
/// use fabula::FabulaConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FabulaConfig::load(None)?;
/// println!("{} attempts per call", config.retry().max_retries());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct FabulaConfig {
    /// Retry discipline for every remote call
    retry: RetryConfig,
    /// Chat completion settings
    chat: ChatConfig,
    /// Voice settings
    speech: SpeechConfig,
    /// Illustration settings
    image: ImageConfig,
    /// Rendering settings
    video: VideoConfig,
    /// Upload settings
    upload: UploadConfig,
    /// Output and language defaults
    pipeline: PipelineConfig,
    /// Log filters and format
    logging: LoggingConfig,
}

fn build_error(e: config::ConfigError) -> FabulaError {
    ConfigError::new(format!("Failed to build configuration: {}", e)).into()
}

fn parse_error(e: config::ConfigError) -> FabulaError {
    ConfigError::new(format!("Failed to parse configuration: {}", e)).into()
}

impl FabulaConfig {
    /// Load the bundled defaults overridden by the user's files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when a present file cannot be parsed, when
    /// `explicit` does not exist, or when a value is out of range.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> FabulaResult<Self> {
        debug!("Loading configuration: explicit > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/fabula/fabula.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("fabula").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config: Self = builder
            .build()
            .map_err(build_error)?
            .try_deserialize()
            .map_err(parse_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document over the built-in defaults, ignoring user files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the document cannot be parsed or a value
    /// is out of range.
    pub fn from_toml_str(toml: &str) -> FabulaResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(build_error)?
            .try_deserialize()
            .map_err(parse_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> FabulaResult<()> {
        self.retry.validate()?;
        self.upload.validate()?;
        self.logging.validate()?;
        if *self.video.fps() == 0 {
            return Err(ConfigError::invalid("video.fps", "must be greater than 0").into());
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a value cannot be represented in TOML.
    pub fn to_toml(&self) -> FabulaResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render configuration: {}", e)).into())
    }
}

/// API keys read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    generation_key: String,
    voice_engine_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("generation_key", &"<redacted>")
            .field(
                "voice_engine_key",
                &self.voice_engine_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Credentials {
    /// Credentials with a single generation key.
    pub fn new(generation_key: impl Into<String>) -> Self {
        Self {
            generation_key: generation_key.into(),
            voice_engine_key: None,
        }
    }

    /// Use a separate key for the secondary voice engine.
    pub fn with_voice_engine_key(mut self, key: impl Into<String>) -> Self {
        self.voice_engine_key = Some(key.into());
        self
    }

    /// Read keys from the environment, after loading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the generation key is missing or empty.
    pub fn from_env() -> FabulaResult<Self> {
        dotenvy::dotenv().ok();

        let present = |var: &str| std::env::var(var).ok().filter(|v| !v.trim().is_empty());

        let generation_key = present(GENERATION_KEY_VAR).ok_or_else(|| {
            FabulaError::from(ConfigError::invalid(GENERATION_KEY_VAR, "is not set"))
        })?;

        Ok(Self {
            generation_key,
            voice_engine_key: present(VOICE_ENGINE_KEY_VAR),
        })
    }

    /// Key for chat, primary voice and image calls.
    pub fn generation_key(&self) -> &str {
        &self.generation_key
    }

    /// Key for the secondary voice engine, when it differs.
    pub fn voice_engine_key(&self) -> Option<&str> {
        self.voice_engine_key.as_deref()
    }
}
