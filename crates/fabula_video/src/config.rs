//! Rendering settings, loaded from the `[video]` table of `fabula.toml`.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Clip and final-video rendering settings.
///
/// # Example
///
/// ```
/// use fabula_video::VideoConfig;
///
/// let config = VideoConfig::default();
/// assert_eq!(*config.fps(), 24);
/// assert_eq!(config.frame_size(), "1024x576");
/// ```
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
pub struct VideoConfig {
    /// Frames per second of every clip
    fps: u32,
    /// Zoom added per second of clip (`1 + rate * t`)
    zoom_rate: f64,
    /// Silence appended after each narration (milliseconds)
    tail_padding_ms: u64,
    /// Clip length when a narration cannot be probed (seconds)
    silent_clip_secs: f64,
    /// Output width in pixels
    width: u32,
    /// Output height in pixels
    height: u32,
    /// Video encoder
    video_codec: String,
    /// Audio encoder
    audio_codec: String,
    /// ffmpeg executable
    ffmpeg: String,
    /// ffprobe executable
    ffprobe: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: 24,
            zoom_rate: 0.02,
            tail_padding_ms: 500,
            silent_clip_secs: 5.0,
            width: 1024,
            height: 576,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl VideoConfig {
    /// Padding appended to narrated clips.
    pub fn tail_padding(&self) -> Duration {
        Duration::from_millis(self.tail_padding_ms)
    }

    /// `WIDTHxHEIGHT`, as ffmpeg expects it.
    pub fn frame_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}
