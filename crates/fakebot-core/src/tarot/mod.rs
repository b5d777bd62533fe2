//! Tarot spread domain module.
//!
//! - `deck`: Card data and the two built-in decks
//! - `spread`: Three-card draw, reveal and reset (`TarotSpread`, `TarotReading`)

mod deck;
mod spread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use deck::{TarotCard, TarotDeck};
pub use spread::{SPREAD_SIZE, SpreadPosition, TarotReading, TarotSpread};

/// Misuse of a [`TarotSpread`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TarotError {
    /// `reveal` was called before `select`.
    #[error("No cards have been drawn yet")]
    NoDraw,

    /// `reveal` was called on a draw that is already face-up.
    #[error("The drawn cards are already revealed")]
    AlreadyRevealed,

    /// The deck cannot supply a full spread.
    #[error("Deck has {available} cards but a spread needs {required}")]
    DeckTooSmall { available: usize, required: usize },
}
