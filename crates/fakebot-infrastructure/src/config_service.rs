//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` (or an explicit path) and caches
//! it. A missing file is not an error; an unreadable or invalid one is.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use fakebot_core::config::AppConfig;
use fakebot_core::{FakebotError, Result};

use crate::paths::FakebotPaths;

/// Loads and caches the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Uses `path` when given, otherwise the platform config file.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => FakebotPaths::config_file()?,
        };
        Ok(Self::at(path))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<AppConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| FakebotError::internal("config cache poisoned"))?;
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_from(&self.path)?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| FakebotError::internal("config cache poisoned"))?;
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_from(path: &Path) -> Result<AppConfig> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[ConfigService] {} not found, using defaults",
                    path.display()
                );
                return Ok(AppConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!("[ConfigService] Loaded {}", path.display());
        Ok(config)
    }
}
