//! Application configuration model.
//!
//! Loaded from TOML by the infrastructure layer. Every section is optional;
//! a missing file yields [`AppConfig::default`].
//!
//! ```toml
//! [relay]
//! delivery_mode = "queue"      # or "mailbox"
//! poll_interval_ms = 200
//! queue_capacity = 256         # envelopes kept per key file
//! dir = "/tmp/fakebot-relay"
//!
//! [chat]
//! response_delay_min_ms = 1500
//! response_delay_max_ms = 2500
//! origin = "http://localhost:8080"
//!
//! [[persona]]
//! kind = "character"
//! name = "냥냥이"
//! greeting = "냥!"
//! icon = "🐱"
//! responses = ["냥 1", "냥 2", "냥 3", "냥 4", "냥 5"]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FakebotError, Result};
use crate::persona::{PersonaProfile, PersonaResponder};
use crate::relay::DeliveryMode;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub relay: RelayConfig,
    pub chat: ChatConfig,
    #[serde(rename = "persona", skip_serializing_if = "Vec::is_empty")]
    pub personas: Vec<PersonaProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub delivery_mode: DeliveryMode,
    /// How often file-backed observers look for new writes.
    pub poll_interval_ms: u64,
    /// Most envelopes a queue-mode relay file keeps; older ones are
    /// compacted away on write.
    pub queue_capacity: usize,
    /// Shared relay directory; platform data dir when unset.
    pub dir: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryMode::default(),
            poll_interval_ms: 200,
            queue_capacity: 256,
            dir: None,
        }
    }
}

impl RelayConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub response_delay_min_ms: u64,
    pub response_delay_max_ms: u64,
    /// Origin used when printing shareable peer addresses.
    pub origin: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            response_delay_min_ms: 1500,
            response_delay_max_ms: 2500,
            origin: "http://localhost:8080".to_string(),
        }
    }
}

impl AppConfig {
    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.chat.response_delay_min_ms > self.chat.response_delay_max_ms {
            return Err(FakebotError::config(format!(
                "response_delay_min_ms ({}) exceeds response_delay_max_ms ({})",
                self.chat.response_delay_min_ms, self.chat.response_delay_max_ms
            )));
        }
        if self.relay.poll_interval_ms == 0 {
            return Err(FakebotError::config("poll_interval_ms must be positive"));
        }
        if self.relay.queue_capacity == 0 {
            return Err(FakebotError::config("queue_capacity must be positive"));
        }
        for persona in &self.personas {
            persona.validate()?;
        }
        Ok(())
    }

    /// Builds the responder with any persona overrides applied.
    pub fn responder(&self) -> Result<PersonaResponder> {
        PersonaResponder::with_overrides(self.personas.clone())
    }
}
