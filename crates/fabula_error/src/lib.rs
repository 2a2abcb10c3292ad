//! Error types for the fabula workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use fabula_error::{FabulaResult, HttpError};
//!
//! fn fetch_script() -> FabulaResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_script() {
//!     Ok(script) => println!("Got: {}", script),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod io;
mod json;
mod media;
mod pipeline;
mod synthesis;
mod upload;

pub use config::ConfigError;
pub use error::{FabulaError, FabulaErrorKind, FabulaResult};
pub use http::HttpError;
pub use io::IoError;
pub use json::JsonError;
pub use media::MediaError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use synthesis::{SynthesisError, SynthesisErrorKind};
pub use upload::{UploadError, UploadErrorKind};
