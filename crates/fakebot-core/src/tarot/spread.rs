//! Three-card spread: select, reveal, reset.

use serde::{Deserialize, Serialize};

use super::TarotError;
use super::deck::{TarotCard, TarotDeck};
use crate::random::RandomSource;

/// Cards per spread.
pub const SPREAD_SIZE: usize = 3;

/// Where a card sits in the spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadPosition {
    Past,
    Present,
    Future,
}

impl SpreadPosition {
    const ORDER: [SpreadPosition; SPREAD_SIZE] = [Self::Past, Self::Present, Self::Future];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Past => "과거",
            Self::Present => "현재",
            Self::Future => "미래",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Draw {
    indices: [usize; SPREAD_SIZE],
    revealed: bool,
}

/// A deck plus the currently active draw, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarotSpread {
    deck: TarotDeck,
    draw: Option<Draw>,
}

impl TarotSpread {
    pub fn new(deck: TarotDeck) -> Self {
        Self { deck, draw: None }
    }

    pub fn deck(&self) -> &TarotDeck {
        &self.deck
    }

    /// Draws three distinct cards, face-down, replacing any previous draw.
    ///
    /// Uses a partial Fisher-Yates shuffle so every 3-subset (and order) is
    /// equally likely.
    pub fn select<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> [usize; SPREAD_SIZE] {
        let mut pool: Vec<usize> = (0..self.deck.len()).collect();
        for i in 0..SPREAD_SIZE {
            let j = i + rng.next_index(pool.len() - i);
            pool.swap(i, j);
        }
        let indices = [pool[0], pool[1], pool[2]];

        tracing::debug!("[Tarot] Drew indices {:?}", indices);
        self.draw = Some(Draw {
            indices,
            revealed: false,
        });
        indices
    }

    /// Indices of the active draw.
    pub fn drawn(&self) -> Option<[usize; SPREAD_SIZE]> {
        self.draw.as_ref().map(|d| d.indices)
    }

    pub fn is_revealed(&self) -> bool {
        self.draw.as_ref().is_some_and(|d| d.revealed)
    }

    /// Flips all drawn cards face-up at once and returns the full reading.
    ///
    /// # Errors
    ///
    /// - [`TarotError::NoDraw`] if nothing was selected
    /// - [`TarotError::AlreadyRevealed`] if this draw was already revealed
    pub fn reveal(&mut self) -> Result<TarotReading, TarotError> {
        let draw = self.draw.as_mut().ok_or(TarotError::NoDraw)?;
        if draw.revealed {
            return Err(TarotError::AlreadyRevealed);
        }
        draw.revealed = true;

        let cards = SpreadPosition::ORDER
            .iter()
            .zip(draw.indices)
            .map(|(position, index)| (*position, self.deck.cards()[index].clone()))
            .collect();

        Ok(TarotReading { cards })
    }

    /// Clears the draw, returning to the pre-selection state.
    pub fn reset(&mut self) {
        self.draw = None;
    }
}

impl Default for TarotSpread {
    fn default() -> Self {
        Self::new(TarotDeck::classic())
    }
}

/// The three revealed cards with their positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotReading {
    cards: Vec<(SpreadPosition, TarotCard)>,
}

impl TarotReading {
    pub fn cards(&self) -> &[(SpreadPosition, TarotCard)] {
        &self.cards
    }

    /// Renders the whole reading as a single chat message.
    pub fn to_message_text(&self) -> String {
        self.cards
            .iter()
            .map(|(position, card)| {
                format!(
                    "[{}] 🃏 {} 카드가 선택되었습니다.\n\n{}\n\n이 카드는 {}을 의미합니다. ✨",
                    position.label(),
                    card.name,
                    card.meaning,
                    card.interpretation
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};
    use std::collections::HashSet;

    #[test]
    fn test_select_draws_three_distinct_in_range_for_both_decks() {
        for deck in [TarotDeck::classic(), TarotDeck::compact()] {
            let size = deck.len();
            let mut spread = TarotSpread::new(deck);
            let mut rng = SeededRandom::new(size as u64);

            for _ in 0..200 {
                let drawn = spread.select(&mut rng);
                let unique: HashSet<usize> = drawn.iter().copied().collect();
                assert_eq!(unique.len(), SPREAD_SIZE);
                assert!(drawn.iter().all(|&i| i < size));
                assert!(!spread.is_revealed());
            }
        }
    }

    #[test]
    fn test_select_covers_whole_deck() {
        let mut spread = TarotSpread::new(TarotDeck::compact());
        let mut rng = SeededRandom::new(3);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.extend(spread.select(&mut rng));
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_scripted_select_is_partial_fisher_yates() {
        let mut spread = TarotSpread::default();
        // swap(0,0+9), swap(1,1+0), swap(2,2+3)
        let drawn = spread.select(&mut ScriptedRandom::new(vec![9, 0, 3]));
        assert_eq!(drawn, [9, 1, 5]);
    }

    #[test]
    fn test_reveal_without_draw_fails() {
        let mut spread = TarotSpread::default();
        assert_eq!(spread.reveal(), Err(TarotError::NoDraw));
    }

    #[test]
    fn test_reveal_returns_all_three_once() {
        let mut spread = TarotSpread::default();
        let drawn = spread.select(&mut ScriptedRandom::new(vec![0, 0, 0]));
        let reading = spread.reveal().unwrap();

        let positions: Vec<SpreadPosition> = reading.cards().iter().map(|(p, _)| *p).collect();
        assert_eq!(
            positions,
            vec![SpreadPosition::Past, SpreadPosition::Present, SpreadPosition::Future]
        );
        for ((_, card), index) in reading.cards().iter().zip(drawn) {
            assert_eq!(card, &spread.deck().cards()[index]);
        }

        assert!(spread.is_revealed());
        assert_eq!(spread.reveal(), Err(TarotError::AlreadyRevealed));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut spread = TarotSpread::default();
        spread.select(&mut SeededRandom::new(1));
        spread.reveal().unwrap();
        spread.reset();

        assert_eq!(spread, TarotSpread::default());
        assert_eq!(spread.drawn(), None);
        assert!(!spread.is_revealed());
    }

    #[test]
    fn test_message_text_contains_each_card_verbatim_once() {
        let mut spread = TarotSpread::default();
        spread.select(&mut ScriptedRandom::new(vec![0, 0, 0]));
        let text = spread.reveal().unwrap().to_message_text();

        assert!(text.starts_with("[과거] 🃏 The Fool 카드가 선택되었습니다."));
        assert_eq!(text.matches("새로운 시작과 모험").count(), 1);
        assert_eq!(text.matches("무한한 가능성과 새로운 여정의 시작").count(), 1);
        assert!(text.contains("[현재] 🃏 The Magician"));
        assert!(text.contains("[미래] 🃏 The High Priestess"));
    }
}
