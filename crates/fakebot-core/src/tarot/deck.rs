//! Tarot card data.

use serde::{Deserialize, Serialize};

use super::TarotError;
use super::spread::SPREAD_SIZE;

/// A single card with its reading text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotCard {
    pub id: u32,
    pub name: String,
    /// Short meaning shown when the card flips
    pub meaning: String,
    /// Longer interpretation appended to the reading
    pub interpretation: String,
}

/// An ordered deck of cards to draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotDeck {
    cards: Vec<TarotCard>,
}

const MAJOR_ARCANA: [(&str, &str, &str); 10] = [
    ("The Fool", "새로운 시작과 모험", "무한한 가능성과 새로운 여정의 시작"),
    ("The Magician", "의지력과 창조력", "목표 달성을 위한 강한 의지와 능력"),
    ("The High Priestess", "직감과 내면의 지혜", "숨겨진 지식과 영적 통찰력"),
    ("The Empress", "풍요와 창조성", "모성애와 자연스러운 성장"),
    ("The Emperor", "권위와 안정성", "질서와 통제, 리더십"),
    ("The Lovers", "사랑과 선택", "중요한 관계와 결정의 순간"),
    ("The Chariot", "승리와 의지력", "목표 달성을 위한 강한 추진력"),
    ("Strength", "내면의 힘과 용기", "인내와 자제력을 통한 성공"),
    ("The Hermit", "내적 성찰과 지혜", "혼자만의 시간을 통한 깨달음"),
    ("Wheel of Fortune", "운명과 변화", "인생의 전환점과 새로운 기회"),
];

impl TarotDeck {
    /// Builds a deck from arbitrary cards.
    ///
    /// # Errors
    ///
    /// Returns [`TarotError::DeckTooSmall`] if fewer cards than a spread needs.
    pub fn new(cards: Vec<TarotCard>) -> Result<Self, TarotError> {
        if cards.len() < SPREAD_SIZE {
            return Err(TarotError::DeckTooSmall {
                available: cards.len(),
                required: SPREAD_SIZE,
            });
        }
        Ok(Self { cards })
    }

    /// The ten-card major arcana deck.
    pub fn classic() -> Self {
        Self::from_table(&MAJOR_ARCANA)
    }

    /// The six-card compact deck (first six of the major arcana).
    pub fn compact() -> Self {
        Self::from_table(&MAJOR_ARCANA[..6])
    }

    fn from_table(table: &[(&str, &str, &str)]) -> Self {
        let cards = table
            .iter()
            .enumerate()
            .map(|(i, (name, meaning, interpretation))| TarotCard {
                id: i as u32 + 1,
                name: name.to_string(),
                meaning: meaning.to_string(),
                interpretation: interpretation.to_string(),
            })
            .collect();
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card(&self, index: usize) -> Option<&TarotCard> {
        self.cards.get(index)
    }

    pub fn cards(&self) -> &[TarotCard] {
        &self.cards
    }
}

impl Default for TarotDeck {
    fn default() -> Self {
        Self::classic()
    }
}
