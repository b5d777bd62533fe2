//! Persona domain model.
//!
//! A persona is the face the "AI" wears: a display name, a greeting and a
//! fixed table of canned replies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::error::{FakebotError, Result};

/// Number of canned replies every persona carries.
pub const RESPONSES_PER_PERSONA: usize = 5;

/// Supported persona tags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PersonaKind {
    /// Cute character friend
    Character,
    /// Serious "GPT-4 style" counselor
    Counselor,
    /// Mystic tarot reader
    Tarot,
    /// Gentle counselor used for the counselor/client relay sessions
    Professional,
}

impl PersonaKind {
    /// The tag used on the command line, in config files and in export names.
    pub fn tag(&self) -> &'static str {
        self.into()
    }

    /// All supported personas in display order.
    pub fn all() -> Vec<PersonaKind> {
        PersonaKind::iter().collect()
    }
}

impl FromStr for PersonaKind {
    type Err = FakebotError;

    /// Parses a persona tag, failing fast on anything unsupported.
    fn from_str(tag: &str) -> Result<Self> {
        let normalized = tag.trim().to_ascii_lowercase();
        PersonaKind::iter()
            .find(|kind| kind.tag() == normalized)
            .ok_or_else(|| {
                let supported: Vec<&str> = PersonaKind::iter().map(|k| k.tag()).collect();
                FakebotError::config(format!(
                    "unknown persona '{}' (supported: {})",
                    tag,
                    supported.join(", ")
                ))
            })
    }
}

/// Everything needed to present and drive one persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Persona tag
    pub kind: PersonaKind,
    /// Display name shown as the "AI" author
    pub name: String,
    /// First message of every new chat
    pub greeting: String,
    /// Short icon (emoji) shown next to the name
    pub icon: String,
    /// Canned replies, exactly [`RESPONSES_PER_PERSONA`] of them
    pub responses: Vec<String>,
}

impl PersonaProfile {
    /// Checks the invariants a responder relies on.
    pub fn validate(&self) -> Result<()> {
        if self.responses.len() != RESPONSES_PER_PERSONA {
            return Err(FakebotError::config(format!(
                "persona '{}' must define exactly {} responses, found {}",
                self.kind,
                RESPONSES_PER_PERSONA,
                self.responses.len()
            )));
        }
        if let Some(pos) = self.responses.iter().position(|r| r.trim().is_empty()) {
            return Err(FakebotError::config(format!(
                "persona '{}' has an empty response at position {}",
                self.kind, pos
            )));
        }
        if self.name.trim().is_empty() {
            return Err(FakebotError::config(format!(
                "persona '{}' has an empty name",
                self.kind
            )));
        }
        Ok(())
    }
}
