//! Core data types for the fabula story video pipeline.
//!
//! This crate holds the plain values passed between the call executor, the
//! generative clients and the pipeline driver. It performs no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod message;
mod metadata;
mod outcome;
mod profile;
mod request;
mod response;
mod role;
mod script;

pub use message::ChatMessage;
pub use metadata::{DEFAULT_CATEGORY_ID, MAX_TITLE_CHARS, VideoMetadata};
pub use outcome::{BODY_PREVIEW_CHARS, NetworkFailureKind, Outcome, body_preview};
pub use profile::LanguageProfile;
pub use request::{Method, Payload, RequestDescriptor, RequestDescriptorBuilder};
pub use response::RemoteResponse;
pub use role::Role;
pub use script::{
    DEFAULT_CHARACTER_ANCHOR, DEFAULT_VISUAL_ACTION, MISSING_NARRATION, Scene, Script,
};
