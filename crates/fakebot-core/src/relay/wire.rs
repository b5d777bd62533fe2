//! JSON framing of relayed messages.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::message::{Message, MessageId, MessageRole};

pub fn encode(message: &Message) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Loose view of an inbound payload; only `id` is required.
#[derive(Deserialize)]
struct InboundPayload {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Decodes a relayed payload into a message with the given role.
///
/// Returns `None` for empty or malformed payloads and for payloads without a
/// usable `id`. The sender's claimed role is not trusted: the receiving peer
/// decides which side the message came from.
pub fn decode(payload: &str, role: MessageRole) -> Option<Message> {
    if payload.trim().is_empty() {
        return None;
    }

    let parsed: InboundPayload = match serde_json::from_str(payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("[Relay] Ignoring malformed payload: {}", e);
            return None;
        }
    };

    let id = match parsed.id {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => {
            tracing::debug!("[Relay] Ignoring payload without an id");
            return None;
        }
    };

    Some(Message {
        id: MessageId::from_raw(id),
        role,
        content: parsed.content.unwrap_or_default(),
        timestamp: parsed.timestamp.unwrap_or_else(Utc::now),
    })
}
