//! Conversation message types.
//!
//! A [`Message`] is immutable once created. Its serialized form doubles as the
//! relay wire format, so field names follow what peers exchange:
//! `{"id", "type", "content", "timestamp"}`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message typed by the person chatting with the "AI".
    #[serde(rename = "user")]
    User,
    /// Message presented as coming from the "AI" (scripted or impersonated).
    #[serde(rename = "ai")]
    Assistant,
}

/// Opaque, time-ordered message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generates a fresh identifier derived from the current time.
    ///
    /// UUID v7 embeds the creation millisecond and stays unique within it.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an identifier received from a peer.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier, derived from creation time.
    pub id: MessageId,
    /// The role of the message sender.
    #[serde(rename = "type")]
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the current time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// True when the text has no visible content.
///
/// Every input boundary (chat submit, manual reply, relay send) checks this
/// so blank input never reaches a transcript or the relay. Accepted text is
/// kept verbatim, surrounding whitespace included.
pub(crate) fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
