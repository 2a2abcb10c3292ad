//! YouTube upload for fabula.
//!
//! Videos are sent through a resumable session: one request opens the
//! session with the video's metadata, then the file follows in fixed-size
//! chunks. Every request goes through the shared call executor.

#![warn(missing_docs)]

mod config;
mod uploader;

pub use config::{CHUNK_GRANULARITY, UploadConfig, UploadConfigBuilder};
pub use uploader::{UploadReceipt, YouTubeUploader, read_token};
