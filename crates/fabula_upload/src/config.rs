//! Upload settings, loaded from the `[upload]` table of `fabula.toml`.

use derive_getters::Getters;
use fabula_error::{ConfigError, FabulaResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Chunks must be a multiple of this size, except the last.
pub const CHUNK_GRANULARITY: usize = 256 * 1024;

/// Where credentials live and how videos are published.
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
pub struct UploadConfig {
    /// Resumable-upload endpoint
    endpoint: String,
    /// Stored OAuth credential file (JSON with `token` or `access_token`)
    token_path: PathBuf,
    /// Initial privacy status
    privacy_status: String,
    /// Whether the video is declared as made for kids
    made_for_kids: bool,
    /// Bytes sent per chunk
    chunk_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/upload/youtube/v3/videos".to_string(),
            token_path: PathBuf::from("token.json"),
            privacy_status: "private".to_string(),
            made_for_kids: false,
            chunk_size: 32 * CHUNK_GRANULARITY,
        }
    }
}

impl UploadConfig {
    /// Check the chunk size.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` unless `chunk_size` is a positive multiple of
    /// [`CHUNK_GRANULARITY`].
    pub fn validate(&self) -> FabulaResult<()> {
        if self.chunk_size == 0 || self.chunk_size % CHUNK_GRANULARITY != 0 {
            return Err(ConfigError::invalid(
                "upload.chunk_size",
                format!("must be a positive multiple of {} bytes", CHUNK_GRANULARITY),
            )
            .into());
        }
        Ok(())
    }
}
