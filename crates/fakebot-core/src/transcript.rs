//! Append-only conversation transcript and its plain-text export.

use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageRole};

/// Ordered, append-only list of messages (oldest first).
///
/// Insertion order is display order. Messages are never edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns a reference to the stored copy.
    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        // just pushed
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Renders the transcript as downloadable text.
    ///
    /// One `<label>: <content>` line per message, entries separated by a
    /// blank line, terminated by a single newline. Line breaks inside a
    /// message are folded with [`LINE_BREAK_SEPARATOR`]. An empty transcript
    /// renders as an empty string.
    pub fn export_text(&self, labels: &TranscriptLabels) -> String {
        if self.messages.is_empty() {
            return String::new();
        }

        let mut out = self
            .messages
            .iter()
            .map(|msg| {
                format!(
                    "{}: {}",
                    labels.label_for(msg.role),
                    single_line(&msg.content)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        out.push('\n');
        out
    }
}

/// Stands in for line breaks inside an exported message.
pub const LINE_BREAK_SEPARATOR: &str = " / ";

/// Joins the non-blank lines of `content`.
fn single_line(content: &str) -> String {
    if !content.contains(['\n', '\r']) {
        return content.to_string();
    }
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join(LINE_BREAK_SEPARATOR)
}

/// Display labels used when exporting a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLabels {
    pub user: String,
    pub assistant: String,
}

impl TranscriptLabels {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }

    /// Labels for a single-operator persona chat.
    pub fn for_persona(persona_name: &str) -> Self {
        Self::new("사용자", persona_name)
    }

    /// Labels for a counselor/client session.
    pub fn counseling() -> Self {
        Self::new("내담자", "AI 상담사")
    }

    pub fn label_for(&self, role: MessageRole) -> &str {
        match role {
            MessageRole::User => &self.user,
            MessageRole::Assistant => &self.assistant,
        }
    }
}
