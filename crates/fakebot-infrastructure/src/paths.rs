//! Unified path management for fakebot files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/fakebot/           # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/fakebot/      # Data directory
//! └── relay/                   # Shared relay store (one .jsonl per key)
//! ```

use std::path::PathBuf;

use fakebot_core::{FakebotError, Result};

const APP_DIR: &str = "fakebot";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// No platform config directory.
    ConfigDirNotFound,
    /// No platform data directory.
    DataDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for FakebotError {
    fn from(err: PathError) -> Self {
        FakebotError::config(err.to_string())
    }
}

pub struct FakebotPaths;

impl FakebotPaths {
    /// `~/.config/fakebot/` or the platform equivalent.
    pub fn config_dir() -> std::result::Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// `~/.local/share/fakebot/` or the platform equivalent.
    pub fn data_dir() -> std::result::Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DataDirNotFound)
    }

    pub fn config_file() -> std::result::Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default directory for the file relay store.
    pub fn relay_dir() -> std::result::Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("relay"))
    }

    /// Relay directory to use: an explicit one wins over the default.
    pub fn resolve_relay_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit {
            Some(dir) => Ok(dir),
            None => Ok(Self::relay_dir()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let Ok(config_dir) = FakebotPaths::config_dir() else {
            return;
        };
        assert!(config_dir.ends_with("fakebot"));

        let config_file = FakebotPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_relay_dir() {
        let Ok(data_dir) = FakebotPaths::data_dir() else {
            return;
        };
        let relay_dir = FakebotPaths::relay_dir().unwrap();
        assert!(relay_dir.ends_with("relay"));
        assert!(relay_dir.starts_with(&data_dir));
    }

    #[test]
    fn test_explicit_relay_dir_wins() {
        let dir = PathBuf::from("/tmp/fakebot-relay");
        assert_eq!(
            FakebotPaths::resolve_relay_dir(Some(dir.clone())).unwrap(),
            dir
        );
    }
}
