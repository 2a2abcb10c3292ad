//! Video assembly for fabula.
//!
//! Each narrated segment becomes a clip: the segment's illustration, slowly
//! zooming, for the length of its narration plus a short pause. Clips are
//! joined into one video per language. All rendering shells out to
//! `ffmpeg`/`ffprobe`; the argument vectors are built by pure functions in
//! this crate.

#![warn(missing_docs)]

mod args;
mod assembler;
mod config;

pub use args::{
    clip_args, concat_args, concat_list, parse_duration, placeholder_args, probe_args, zoom_filter,
};
pub use assembler::{ClipSource, VideoAssembler, VideoBackend};
pub use config::{VideoConfig, VideoConfigBuilder};
