//! Scripted response generation.

use std::collections::HashMap;

use super::model::{PersonaKind, PersonaProfile};
use super::preset::get_default_presets;
use crate::error::{FakebotError, Result};
use crate::random::RandomSource;

/// Picks canned replies for personas.
///
/// Holds one validated profile per [`PersonaKind`]. Construction fails if a
/// profile is invalid or a kind is missing, so lookups never fail later.
#[derive(Debug, Clone)]
pub struct PersonaResponder {
    profiles: HashMap<PersonaKind, PersonaProfile>,
}

impl PersonaResponder {
    /// Creates a responder from the built-in presets.
    pub fn with_defaults() -> Self {
        let profiles = get_default_presets()
            .into_iter()
            .map(|p| (p.kind, p))
            .collect();
        Self { profiles }
    }

    /// Creates a responder from the presets with some profiles replaced.
    ///
    /// # Errors
    ///
    /// Returns a config error if an override breaks a profile invariant or
    /// the same persona is overridden twice.
    pub fn with_overrides(overrides: Vec<PersonaProfile>) -> Result<Self> {
        let mut responder = Self::with_defaults();
        let mut replaced = Vec::new();

        for profile in overrides {
            profile.validate()?;
            if replaced.contains(&profile.kind) {
                return Err(FakebotError::config(format!(
                    "persona '{}' is overridden more than once",
                    profile.kind
                )));
            }
            replaced.push(profile.kind);
            tracing::debug!("[Persona] Overriding preset for '{}'", profile.kind);
            responder.profiles.insert(profile.kind, profile);
        }

        Ok(responder)
    }

    pub fn profile(&self, kind: PersonaKind) -> &PersonaProfile {
        // every kind is inserted by with_defaults
        &self.profiles[&kind]
    }

    /// Returns one of the persona's canned replies, chosen uniformly.
    ///
    /// The input text is deliberately ignored: replies do not depend on
    /// what was said.
    pub fn respond<R: RandomSource + ?Sized>(
        &self,
        kind: PersonaKind,
        _input: &str,
        rng: &mut R,
    ) -> &str {
        let responses = &self.profile(kind).responses;
        &responses[rng.next_index(responses.len())]
    }
}

impl Default for PersonaResponder {
    fn default() -> Self {
        Self::with_defaults()
    }
}
