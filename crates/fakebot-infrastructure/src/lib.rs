//! Infrastructure for fakebot: relay stores, files and configuration.
//!
//! # Module Structure
//!
//! - `memory_relay_store`: In-process [`RelayStore`](fakebot_core::relay::RelayStore)
//! - `file_relay_store`: Directory-backed store shared between processes
//! - `storage`: Atomic file writes with cross-process locking
//! - `config_service`: Loads `config.toml`
//! - `paths`: Platform directories
//! - `transcript_exporter`: Transcript text files

pub mod config_service;
pub mod file_relay_store;
pub mod memory_relay_store;
pub mod paths;
pub mod storage;
pub mod transcript_exporter;

pub use crate::config_service::ConfigService;
pub use crate::file_relay_store::FileRelayStore;
pub use crate::memory_relay_store::MemoryRelayStore;
pub use crate::paths::FakebotPaths;
pub use crate::transcript_exporter::{ExportTag, TranscriptExporter};
