use anyhow::{Context, Result};
use colored::Colorize;
use fakebot_application::{ChatEvent, ChatService};
use fakebot_core::MessageRole;
use fakebot_core::chat::{ResponseMode, SubmitOutcome};
use fakebot_core::config::AppConfig;
use fakebot_core::persona::PersonaKind;
use fakebot_core::random::ThreadRandom;
use fakebot_core::tarot::TarotDeck;
use fakebot_infrastructure::TranscriptExporter;

use super::export_dir;
use crate::repl::{
    self, COMMANDS, ReplCommand, ReplInput, parse_input, print_error, print_message, print_system,
};

const HELP: &str = "\
/auto             scripted replies after a short pause
/manual           your next line after the user's is the AI's reply
/tarot draw       draw three cards (tarot persona)
/tarot reveal     reveal past, present and future
/tarot reset      put the cards back
/export [dir]     save the transcript as a text file
/quit             leave
//text            send text that starts with /";

pub async fn run(
    config: &AppConfig,
    persona: PersonaKind,
    manual: bool,
    compact: bool,
) -> Result<()> {
    let deck = compact.then(TarotDeck::compact);
    let (service, mut events) =
        ChatService::from_config(persona, config, deck, Box::new(ThreadRandom))
            .context("Failed to start chat")?;
    if manual {
        service.set_mode(ResponseMode::Manual).await;
    }

    let profile = service.profile().await;
    let ai_label = format!("{} {}", profile.icon, profile.name);

    println!("{}", format!("=== {} ===", profile.name).bright_magenta().bold());
    print_system(&format!(
        "Mode: {}. Type '/help' for commands or '/quit' to exit.",
        service.mode().await.label()
    ));
    println!();
    print_message(&ai_label, &profile.greeting, MessageRole::Assistant);

    let printer_label = ai_label.clone();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ChatEvent::Reply(message) => {
                    print_message(&printer_label, &message.content, MessageRole::Assistant)
                }
            }
        }
    });

    let mut rl = repl::editor(COMMANDS)?;
    while let Some(line) = repl::read_line(&mut rl, ">> ")? {
        match parse_input(&line) {
            ReplInput::Text(text) => match service.submit(&text).await {
                Ok(SubmitOutcome::AwaitingGenerated { .. }) => {
                    print_system(&format!("{} is typing...", profile.name));
                }
                Ok(SubmitOutcome::AwaitingManual { .. }) => {
                    print_system("Type the AI's reply.");
                }
                Ok(SubmitOutcome::ManualReply { message }) => {
                    print_message(&ai_label, &message.content, MessageRole::Assistant);
                }
                Err(e) if e.is_empty_message() => {}
                Err(e) => print_error(&e.to_string()),
            },
            ReplInput::Command(ReplCommand::Auto) => {
                service.set_mode(ResponseMode::Automatic).await;
                print_system(&format!("Mode: {}", ResponseMode::Automatic.label()));
            }
            ReplInput::Command(ReplCommand::Manual) => {
                service.set_mode(ResponseMode::Manual).await;
                print_system(&format!("Mode: {}", ResponseMode::Manual.label()));
            }
            ReplInput::Command(ReplCommand::TarotDraw) => match service.draw_tarot().await {
                Ok(_) => print_system("🃏 🃏 🃏  Three cards drawn. '/tarot reveal' to turn them."),
                Err(e) => print_error(&e.to_string()),
            },
            ReplInput::Command(ReplCommand::TarotReveal) => match service.reveal_tarot().await {
                Ok(message) => print_message(&ai_label, &message.content, MessageRole::Assistant),
                Err(e) => print_error(&e.to_string()),
            },
            ReplInput::Command(ReplCommand::TarotReset) => match service.reset_tarot().await {
                Ok(()) => print_system("Cards returned to the deck."),
                Err(e) => print_error(&e.to_string()),
            },
            ReplInput::Command(ReplCommand::Export(dir)) => {
                let exporter = TranscriptExporter::new(export_dir(dir));
                match service.export(&exporter).await {
                    Ok(path) => print_system(&format!("Saved {}", path.display())),
                    Err(e) => print_error(&format!("Export failed: {}", e)),
                }
            }
            ReplInput::Command(ReplCommand::Link) => {
                print_system("'/link' is for counselor sessions.");
            }
            ReplInput::Command(ReplCommand::Help) => print_system(HELP),
            ReplInput::Command(ReplCommand::Quit) => break,
            ReplInput::Unknown(command) => print_error(&format!("Unknown command: {}", command)),
        }
    }

    println!("{}", "Goodbye!".bright_green());
    printer.abort();
    Ok(())
}
