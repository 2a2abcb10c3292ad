//! fabula - narrated Bible-story videos.
//!
//! Given a topic and a set of narration languages, fabula asks a chat model
//! for a scene-by-scene script, narrates every segment, illustrates every
//! scene with one shared seed, joins narrated stills into one video per
//! language, writes localized metadata and optionally uploads the result.
//!
//! # Quick Start
//!
//! ```no_run
//! use fabula::{Credentials, FabulaConfig, Pipeline};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FabulaConfig::load(None)?;
//! let pipeline = Pipeline::from_config(&config, &Credentials::from_env()?)?;
//!
//! let report = pipeline
//!     .run("Joseph's Coat", &["en".to_string(), "te".to_string()], false)
//!     .await?;
//! println!("{:?}", report.videos);
//! # Ok(())
//! # }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - OpenTelemetry span export bridged from `tracing`
//! - `ffmpeg` - run tests that need `ffmpeg`/`ffprobe` on `PATH`
//!
//! # Architecture
//!
//! - `fabula_error` - Error types
//! - `fabula_core` - Request descriptors, outcomes, scripts, profiles, metadata
//! - `fabula_retry` - Resilient call executor
//! - `fabula_cache` - Language profile cache
//! - `fabula_models` - Chat, speech and image clients
//! - `fabula_video` - ffmpeg assembly
//! - `fabula_upload` - Resumable YouTube upload
//!
//! This crate (`fabula`) re-exports everything for convenience.

#![warn(missing_docs)]

mod config;
mod layout;
mod logging;
mod pipeline;

pub use config::{
    Credentials, FabulaConfig, GENERATION_KEY_VAR, PipelineConfig, PipelineConfigBuilder,
    VOICE_ENGINE_KEY_VAR,
};
pub use layout::{OutputLayout, safe_name, setup_folders, validate_language};
pub use logging::{LoggingConfig, LoggingConfigBuilder, init_logging};
pub use pipeline::{Pipeline, ProfileCache, RunReport};

pub use fabula_cache::*;
pub use fabula_core::*;
pub use fabula_error::*;
pub use fabula_models::*;
pub use fabula_retry::*;
pub use fabula_upload::*;
pub use fabula_video::*;

// OpenTelemetry span export
#[cfg(feature = "observability")]
pub mod observability;
