//! Language profile caching.
//!
//! Each pipeline run owns one [`LanguageProfileCache`]. A profile is resolved
//! at most once per language code and shared afterwards; failed or incomplete
//! resolutions are replaced by [`LanguageProfile::fallback`].
//!
//! [`LanguageProfile::fallback`]: fabula_core::LanguageProfile::fallback

#![warn(missing_docs)]

mod cache;

pub use cache::{LanguageProfileCache, ProfileResolver, StaticResolver};
