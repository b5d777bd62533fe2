use anyhow::Result;
use colored::Colorize;
use fakebot_core::MessageRole;
use fakebot_core::config::AppConfig;
use fakebot_core::persona::PersonaKind;
use fakebot_core::random::{RandomSource, SeededRandom, ThreadRandom};
use fakebot_core::tarot::{TarotDeck, TarotSpread};

use crate::repl::print_message;

/// One-shot draw and reveal, no chat.
pub fn run(config: &AppConfig, compact: bool, seed: Option<u64>) -> Result<()> {
    let responder = config.responder()?;
    let profile = responder.profile(PersonaKind::Tarot);

    let deck = if compact {
        TarotDeck::compact()
    } else {
        TarotDeck::classic()
    };
    let mut rng: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };

    let mut spread = TarotSpread::new(deck);
    let drawn = spread.select(&mut rng);
    tracing::debug!("[Tarot] {} cards from a {}-card deck", drawn.len(), spread.deck().len());

    let label = format!("{} {}", profile.icon, profile.name);
    print_message(&label, &profile.greeting, MessageRole::Assistant);
    println!("{}", "🃏 🃏 🃏".bold());
    println!();
    print_message(&label, &spread.reveal()?.to_message_text(), MessageRole::Assistant);
    Ok(())
}
