//! Chat messages sent to completion endpoints.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single text message in a chat-completion request.
///
/// # Examples
///
/// ```
/// use fabula_core::{ChatMessage, Role};
///
/// let message = ChatMessage::system("You are a storyteller.");
/// assert_eq!(message.role, Role::System);
/// assert!(message.content.contains("storyteller"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author
    pub role: Role,
    /// Plain-text content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}
