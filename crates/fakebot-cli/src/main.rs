use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fakebot_core::persona::PersonaKind;
use fakebot_core::relay::{PeerRole, SessionId};
use fakebot_core::route::PeerRoute;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod repl;

#[derive(Parser)]
#[command(name = "fakebot")]
#[command(about = "fakebot - a pretend AI chat you answer yourself", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Shared relay directory for counselor/client sessions
    #[arg(long, global = true)]
    relay_dir: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List personas and their greetings
    Personas,
    /// Chat with a persona (character, counselor, tarot, professional)
    Chat {
        persona: PersonaKind,
        /// Start in manual mode: you type the AI's replies
        #[arg(long)]
        manual: bool,
        /// Use the six-card deck for tarot
        #[arg(long)]
        compact: bool,
    },
    /// Draw and reveal a three-card spread
    Tarot {
        #[arg(long)]
        compact: bool,
        /// Fixed seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Counselor/client session management
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Join a session as the (secretly human) counselor
    Counselor { session: SessionId },
    /// Join a session as the client
    Client { session: SessionId },
    /// Join from a shared address such as http://localhost:8080/client/<id>
    Join { address: PeerRoute },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Create a session id and print both addresses
    New,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "fakebot=debug" } else { "fakebot=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = commands::load_config(cli.config.clone())?;

    match cli.command {
        Commands::Personas => commands::personas::run(&config)?,
        Commands::Chat {
            persona,
            manual,
            compact,
        } => commands::chat::run(&config, persona, manual, compact).await?,
        Commands::Tarot { compact, seed } => commands::tarot::run(&config, compact, seed)?,
        Commands::Session { action } => match action {
            SessionAction::New => commands::session::new_session(&config),
        },
        Commands::Counselor { session } => {
            commands::session::join(&config, cli.relay_dir, PeerRole::Counselor, session).await?
        }
        Commands::Client { session } => {
            commands::session::join(&config, cli.relay_dir, PeerRole::Client, session).await?
        }
        Commands::Join { address } => {
            commands::session::join(&config, cli.relay_dir, address.role, address.session).await?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_accepts_shared_address() {
        let cli = Cli::try_parse_from([
            "fakebot",
            "join",
            "http://localhost:8080/client/1718000000000",
        ])
        .unwrap();
        let Commands::Join { address } = cli.command else {
            panic!("expected join");
        };
        assert_eq!(address.role, PeerRole::Client);
        assert_eq!(address.session.as_str(), "1718000000000");

        let cli = Cli::try_parse_from(["fakebot", "join", "/counselor/42"]).unwrap();
        let Commands::Join { address } = cli.command else {
            panic!("expected join");
        };
        assert_eq!(address.role, PeerRole::Counselor);
    }

    #[test]
    fn test_join_rejects_other_addresses() {
        for address in ["/admin/42", "/client", "http://localhost:8080/"] {
            assert!(Cli::try_parse_from(["fakebot", "join", address]).is_err(), "{}", address);
        }
    }
}
