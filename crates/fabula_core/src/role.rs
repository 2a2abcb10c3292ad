//! Chat participant roles.

use serde::{Deserialize, Serialize};

/// Role of a chat-completion message author.
///
/// Serialized in lowercase, matching OpenAI-compatible endpoints.
///
/// # Examples
///
/// ```
/// use fabula_core::Role;
///
/// assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
/// assert_eq!(format!("{}", Role::User), "user");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the conversation
    #[display("system")]
    System,
    /// The caller's turn
    #[display("user")]
    User,
    /// The model's turn
    #[display("assistant")]
    Assistant,
}
