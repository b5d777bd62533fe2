use std::path::PathBuf;

use anyhow::{Context, Result};
use fakebot_core::config::AppConfig;
use fakebot_infrastructure::ConfigService;

pub mod chat;
pub mod personas;
pub mod session;
pub mod tarot;

pub fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let service = ConfigService::new(path).context("Failed to resolve config path")?;
    service
        .get_config()
        .with_context(|| format!("Failed to load config from {}", service.path().display()))
}

/// Export target: the given directory or the working directory.
pub fn export_dir(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| PathBuf::from("."))
}
