use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use fakebot_application::{PeerEvent, PeerService};
use fakebot_core::config::AppConfig;
use fakebot_core::persona::PersonaKind;
use fakebot_core::relay::{PeerRole, RelayStore, SessionId};
use fakebot_core::route::PeerRoute;
use fakebot_core::{MessageRole, TranscriptLabels};
use fakebot_infrastructure::{FileRelayStore, TranscriptExporter};

use super::export_dir;
use crate::repl::{
    self, ReplCommand, ReplInput, parse_input, print_error, print_message, print_system,
};

const PEER_COMMANDS: &[&str] = &["/export", "/link", "/help", "/quit"];

const HELP: &str = "\
/link             show the address to give the other side
/export [dir]     save the transcript as a text file
/quit             leave
//text            send text that starts with /";

/// Prints a fresh session id with both addresses.
pub fn new_session(config: &AppConfig) {
    let session = SessionId::generate();
    let origin = &config.chat.origin;

    println!("{} {}", "Session:".bold(), session);
    for role in [PeerRole::Counselor, PeerRole::Client] {
        let route = PeerRoute::new(role, session.clone());
        println!(
            "  {:<10} {}  ({})",
            role.to_string(),
            route.url(origin).bright_cyan(),
            format!("fakebot join {}", route).bright_black()
        );
    }
}

/// Joins `session` as `role` over the file relay and runs the REPL.
pub async fn join(
    config: &AppConfig,
    relay_dir: Option<PathBuf>,
    role: PeerRole,
    session: SessionId,
) -> Result<()> {
    let store = FileRelayStore::from_config(&config.relay, relay_dir)
        .context("Failed to resolve relay directory")?;
    let relay_path = store.dir().to_path_buf();
    let store: Arc<dyn RelayStore> = Arc::new(store);

    let responder = config.responder().context("Invalid persona overrides")?;
    let greeting = responder.profile(PersonaKind::Professional).greeting.clone();

    let (service, mut events) = PeerService::start(store, role, session, greeting.clone())
        .await
        .with_context(|| format!("Failed to join session via {}", relay_path.display()))?;

    let labels = TranscriptLabels::counseling();
    let link = service.counterpart_url(&config.chat.origin);

    println!(
        "{}",
        format!("=== {} · session {} ===", role, service.session())
            .bright_magenta()
            .bold()
    );
    match role {
        PeerRole::Counselor => print_system(&format!("Give the client this address: {}", link)),
        PeerRole::Client => print_system("Connected. Say anything."),
    }
    print_system("Type '/help' for commands or '/quit' to exit.");
    println!();
    print_message(
        labels.label_for(MessageRole::Assistant),
        &greeting,
        MessageRole::Assistant,
    );

    let printer_labels = labels.clone();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PeerEvent::Received(message) => print_message(
                    printer_labels.label_for(message.role),
                    &message.content,
                    message.role,
                ),
            }
        }
    });

    let mut rl = repl::editor(PEER_COMMANDS)?;
    while let Some(line) = repl::read_line(&mut rl, ">> ")? {
        match parse_input(&line) {
            ReplInput::Text(text) => match service.send(&text).await {
                Ok(_) if role == PeerRole::Client => {
                    print_system("AI 상담사 is typing...");
                }
                Ok(_) => {}
                Err(e) if e.is_empty_message() => {}
                Err(e) => print_error(&e.to_string()),
            },
            ReplInput::Command(ReplCommand::Link) => print_system(&link),
            ReplInput::Command(ReplCommand::Export(dir)) => {
                let exporter = TranscriptExporter::new(export_dir(dir));
                match service.export(&exporter).await {
                    Ok(path) => print_system(&format!("Saved {}", path.display())),
                    Err(e) => print_error(&format!("Export failed: {}", e)),
                }
            }
            ReplInput::Command(ReplCommand::Help) => print_system(HELP),
            ReplInput::Command(ReplCommand::Quit) => break,
            ReplInput::Command(_) => print_system("That command is for persona chats."),
            ReplInput::Unknown(command) => print_error(&format!("Unknown command: {}", command)),
        }
    }

    service.shutdown();
    printer.abort();
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
