//! Shared REPL pieces: the rustyline helper and slash-command parsing.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use fakebot_core::MessageRole;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// Plain text to send.
    Text(String),
    Command(ReplCommand),
    /// A `/word` we do not know.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Auto,
    Manual,
    TarotDraw,
    TarotReveal,
    TarotReset,
    Export(Option<PathBuf>),
    Link,
    Help,
    Quit,
}

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &[
    "/auto",
    "/manual",
    "/tarot draw",
    "/tarot reveal",
    "/tarot reset",
    "/export",
    "/link",
    "/help",
    "/quit",
];

/// Only `/`-prefixed lines are commands. A leading `//` sends the rest of
/// the line, one slash shorter, as text.
pub fn parse_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return ReplInput::Text(line.to_string());
    }
    if trimmed.starts_with("//") {
        let start = line.len() - line.trim_start().len();
        return ReplInput::Text(format!("{}{}", &line[..start], &line[start + 1..]));
    }

    let mut words = trimmed.split_whitespace();
    let command = match (words.next(), words.next()) {
        (Some("/auto"), None) => ReplCommand::Auto,
        (Some("/manual"), None) => ReplCommand::Manual,
        (Some("/tarot"), Some("draw")) => ReplCommand::TarotDraw,
        (Some("/tarot"), Some("reveal")) => ReplCommand::TarotReveal,
        (Some("/tarot"), Some("reset")) => ReplCommand::TarotReset,
        (Some("/export"), dir) => ReplCommand::Export(dir.map(PathBuf::from)),
        (Some("/link"), None) => ReplCommand::Link,
        (Some("/help"), None) => ReplCommand::Help,
        (Some("/quit"), None) => ReplCommand::Quit,
        _ => return ReplInput::Unknown(trimmed.to_string()),
    };
    ReplInput::Command(command)
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new(commands: &[&str]) -> Self {
        Self {
            commands: commands.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

pub type LineEditor = Editor<CliHelper, DefaultHistory>;

pub fn editor(commands: &[&str]) -> Result<LineEditor> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new(commands)));
    Ok(rl)
}

/// Reads the next line. `None` once the operator hits CTRL-D.
pub fn read_line(rl: &mut LineEditor, prompt: &str) -> Result<Option<String>> {
    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                return Ok(Some(line));
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }
    }
}

pub fn print_system(text: &str) {
    println!("{}", text.bright_black());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red());
}

/// Prints a chat message under its speaker label.
pub fn print_message(label: &str, content: &str, role: MessageRole) {
    match role {
        MessageRole::Assistant => {
            println!("{}", format!("[{}]", label).bright_magenta());
            for line in content.lines() {
                println!("{}", line.bright_blue());
            }
        }
        MessageRole::User => {
            println!("{}", format!("[{}]", label).green());
            for line in content.lines() {
                println!("{}", line);
            }
        }
    }
    println!();
}
