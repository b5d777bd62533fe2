use anyhow::{Context, Result};
use colored::Colorize;
use fakebot_core::config::AppConfig;
use fakebot_core::persona::PersonaKind;

pub fn run(config: &AppConfig) -> Result<()> {
    let responder = config.responder().context("Invalid persona overrides")?;

    for kind in PersonaKind::all() {
        let profile = responder.profile(kind);
        println!(
            "{} {} {}",
            profile.icon,
            format!("{:<14}", kind.tag()).bright_cyan(),
            profile.name.bold()
        );
        println!("   {}", profile.greeting.bright_black());
    }
    Ok(())
}
