//! Persona domain module.
//!
//! This module contains the persona model, the built-in presets, and the
//! scripted response generator.
//!
//! # Module Structure
//!
//! - `model`: Persona tags and profiles (`PersonaKind`, `PersonaProfile`)
//! - `preset`: Built-in profiles for every supported persona
//! - `responder`: Canned reply selection (`PersonaResponder`)
//!
//! # Usage
//!
//! ```ignore
//! use fakebot_core::persona::{PersonaKind, PersonaResponder, get_default_presets};
//! ```

mod model;
mod preset;
mod responder;

// Re-export public API
pub use model::{PersonaKind, PersonaProfile, RESPONSES_PER_PERSONA};
pub use preset::get_default_presets;
pub use responder::PersonaResponder;
