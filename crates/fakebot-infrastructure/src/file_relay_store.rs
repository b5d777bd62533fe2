//! Relay store shared between processes through a directory.
//!
//! Every key maps to `<dir>/<key>.jsonl`, one JSON envelope per line:
//!
//! ```text
//! {"seq":3,"origin":"…","old_value":"…","value":"{\"id\":…}","written_at":"…"}
//! ```
//!
//! Writers take the key's lock file, then either replace the file with the
//! single newest envelope ([`DeliveryMode::Mailbox`]) or append to it
//! ([`DeliveryMode::Queue`]). A queue file holds at most `queue_capacity`
//! envelopes: the write that would exceed it rewrites the file with only the
//! newest ones. Observers poll the file and keep a sequence cursor; they
//! never lock. An observer more than `queue_capacity` writes behind misses
//! the compacted envelopes.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fakebot_core::config::RelayConfig;
use fakebot_core::relay::{
    ChangeStream, DeliveryMode, OriginId, RelayStore, RelaySubscription, StorageChange,
};
use fakebot_core::{FakebotError, Result};
use serde::{Deserialize, Serialize};
use tokio::time::{Interval, MissedTickBehavior};

use crate::paths::FakebotPaths;
use crate::storage::AtomicFile;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    seq: u64,
    origin: OriginId,
    #[serde(default)]
    old_value: Option<String>,
    value: String,
    written_at: DateTime<Utc>,
}

/// Relay store persisted under a shared directory.
#[derive(Debug, Clone)]
pub struct FileRelayStore {
    dir: PathBuf,
    mode: DeliveryMode,
    poll_interval: Duration,
    queue_capacity: usize,
}

impl FileRelayStore {
    pub fn new(dir: impl Into<PathBuf>, mode: DeliveryMode, poll_interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            mode,
            poll_interval,
            queue_capacity: RelayConfig::default().queue_capacity,
        }
    }

    /// Caps how many envelopes a queue file keeps (at least one).
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Store in `dir_override`, the configured directory, or the platform
    /// default, in that order.
    pub fn from_config(config: &RelayConfig, dir_override: Option<PathBuf>) -> Result<Self> {
        let dir = FakebotPaths::resolve_relay_dir(dir_override.or_else(|| config.dir.clone()))?;
        Ok(Self::new(dir, config.delivery_mode, config.poll_interval())
            .with_queue_capacity(config.queue_capacity))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of envelopes currently stored for `key`.
    pub async fn retained(&self, key: &str) -> Result<usize> {
        let file = self.file_for(key)?;
        Ok(read_envelopes(file.path()).await?.len())
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(FakebotError::relay(format!(
                "key '{}' cannot be stored as a file name",
                key
            )));
        }
        Ok(AtomicFile::new(self.dir.join(format!("{}.jsonl", key))))
    }
}

#[async_trait]
impl RelayStore for FileRelayStore {
    async fn set(&self, origin: &OriginId, key: &str, value: String) -> Result<()> {
        let file = self.file_for(key)?;
        let origin = origin.clone();
        let mode = self.mode;
        let capacity = self.queue_capacity;

        let seq = tokio::task::spawn_blocking(move || {
            write_envelope(&file, mode, capacity, origin, value)
        })
        .await
        .map_err(|e| FakebotError::internal(format!("relay write task failed: {}", e)))??;

        tracing::trace!("[FileRelayStore] {} <- seq {}", key, seq);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.file_for(key)?;
        let envelopes = read_envelopes(file.path()).await?;
        Ok(envelopes.into_iter().last().map(|e| e.value))
    }

    async fn subscribe(&self, observer: &OriginId, key: &str) -> Result<RelaySubscription> {
        let file = self.file_for(key)?;
        let cursor = read_envelopes(file.path())
            .await?
            .last()
            .map_or(0, |e| e.seq);

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(
            "[FileRelayStore] {} follows {} from seq {}",
            observer,
            file.path().display(),
            cursor
        );

        Ok(RelaySubscription::new(FileChangeStream {
            path: file.path().to_path_buf(),
            key: key.to_string(),
            observer: observer.clone(),
            cursor,
            interval,
        }))
    }

    fn delivery_mode(&self) -> DeliveryMode {
        self.mode
    }
}

/// Writes one envelope under the key's lock. Returns its sequence number.
fn write_envelope(
    file: &AtomicFile,
    mode: DeliveryMode,
    capacity: usize,
    origin: OriginId,
    value: String,
) -> Result<u64> {
    let _lock = file.lock()?;

    let existing = parse_envelopes(file.read()?.as_deref().unwrap_or_default());
    let last = existing.last();
    let envelope = Envelope {
        seq: last.map_or(1, |e| e.seq + 1),
        origin,
        old_value: last.map(|e| e.value.clone()),
        value,
        written_at: Utc::now(),
    };
    let line = serde_json::to_string(&envelope)?;

    match mode {
        DeliveryMode::Mailbox => file.replace(&format!("{}\n", line))?,
        DeliveryMode::Queue if existing.len() < capacity => file.append_line(&line)?,
        DeliveryMode::Queue => {
            let keep = existing.len() + 1 - capacity;
            let mut content = String::new();
            for kept in &existing[keep..] {
                content.push_str(&serde_json::to_string(kept)?);
                content.push('\n');
            }
            content.push_str(&line);
            content.push('\n');
            file.replace(&content)?;
            tracing::debug!(
                "[FileRelayStore] compacted {} to {} envelopes",
                file.path().display(),
                capacity
            );
        }
    }
    Ok(envelope.seq)
}

async fn read_envelopes(path: &Path) -> Result<Vec<Envelope>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(parse_envelopes(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Parses complete lines; a line still being appended is skipped until the
/// next read.
fn parse_envelopes(content: &str) -> Vec<Envelope> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                tracing::trace!("[FileRelayStore] skipping unreadable line: {}", e);
                None
            }
        })
        .collect()
}

struct FileChangeStream {
    path: PathBuf,
    key: String,
    observer: OriginId,
    cursor: u64,
    interval: Interval,
}

#[async_trait]
impl ChangeStream for FileChangeStream {
    /// Polls until another origin writes. Never yields `None`: the directory
    /// outlives any single process.
    async fn next_change(&mut self) -> Option<StorageChange> {
        loop {
            self.interval.tick().await;

            let envelopes = match read_envelopes(&self.path).await {
                Ok(envelopes) => envelopes,
                Err(e) => {
                    tracing::warn!("[FileRelayStore] failed to read {}: {}", self.key, e);
                    continue;
                }
            };

            for envelope in envelopes {
                if envelope.seq <= self.cursor {
                    continue;
                }
                self.cursor = envelope.seq;
                if envelope.origin != self.observer {
                    return Some(StorageChange {
                        key: self.key.clone(),
                        old_value: envelope.old_value,
                        new_value: Some(envelope.value),
                        origin: envelope.origin,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::time::timeout;

    const KEY: &str = "counselor_message_42";

    fn store(dir: &TempDir, mode: DeliveryMode) -> FileRelayStore {
        FileRelayStore::new(dir.path(), mode, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_set_get_roundtrip_through_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir, DeliveryMode::Queue);
        let origin = OriginId::generate();

        assert!(store.get(KEY).await.unwrap().is_none());
        store.set(&origin, KEY, "first".to_string()).await.unwrap();
        store.set(&origin, KEY, "second".to_string()).await.unwrap();

        assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some("second"));
        let content = std::fs::read_to_string(temp_dir.path().join("counselor_message_42.jsonl"))
            .unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_mailbox_file_holds_one_envelope() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir, DeliveryMode::Mailbox);
        let origin = OriginId::generate();

        for value in ["a", "b", "c"] {
            store.set(&origin, KEY, value.to_string()).await.unwrap();
        }

        let content = std::fs::read_to_string(temp_dir.path().join("counselor_message_42.jsonl"))
            .unwrap();
        let envelopes = parse_envelopes(&content);
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].seq, 3);
        assert_eq!(envelopes[0].old_value.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_queue_file_is_compacted_to_capacity() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir, DeliveryMode::Queue).with_queue_capacity(4);
        let origin = OriginId::generate();

        for i in 1..=10 {
            store.set(&origin, KEY, format!("m{}", i)).await.unwrap();
            assert!(store.retained(KEY).await.unwrap() <= 4);
        }

        let content = std::fs::read_to_string(temp_dir.path().join("counselor_message_42.jsonl"))
            .unwrap();
        let seqs: Vec<u64> = parse_envelopes(&content).iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![7, 8, 9, 10]);
        assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some("m10"));
    }

    #[tokio::test]
    async fn test_observer_keeps_up_across_compaction() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir, DeliveryMode::Queue).with_queue_capacity(2);
        let writer = OriginId::generate();
        let mut sub = store.subscribe(&OriginId::generate(), KEY).await.unwrap();

        for i in 1..=6 {
            store.set(&writer, KEY, format!("m{}", i)).await.unwrap();
            let change = timeout(Duration::from_secs(2), sub.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(change.new_value, Some(format!("m{}", i)));
        }
        assert_eq!(store.retained(KEY).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_two_store_handles_see_each_other() {
        let temp_dir = TempDir::new().unwrap();
        let writer_store = store(&temp_dir, DeliveryMode::Queue);
        let reader_store = store(&temp_dir, DeliveryMode::Queue);
        let writer = OriginId::generate();
        let reader = OriginId::generate();

        let mut sub = reader_store.subscribe(&reader, KEY).await.unwrap();
        let mut own = writer_store.subscribe(&writer, KEY).await.unwrap();
        writer_store.set(&writer, KEY, "hello".to_string()).await.unwrap();

        let change = timeout(Duration::from_secs(2), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change.new_value.as_deref(), Some("hello"));
        assert_eq!(change.origin, writer);

        assert!(timeout(Duration::from_millis(100), own.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_unsafe_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir, DeliveryMode::Queue);
        let origin = OriginId::generate();

        for key in ["", "../escape", "a/b", "with space"] {
            assert!(store.set(&origin, key, "x".to_string()).await.is_err(), "{}", key);
        }
    }

    #[test]
    fn test_from_config_prefers_override() {
        let mut config = RelayConfig::default();
        config.dir = Some(PathBuf::from("/tmp/configured"));
        config.delivery_mode = DeliveryMode::Mailbox;

        config.queue_capacity = 8;

        let store = FileRelayStore::from_config(&config, None).unwrap();
        assert_eq!(store.dir(), Path::new("/tmp/configured"));
        assert_eq!(store.queue_capacity, 8);
        assert_eq!(store.delivery_mode(), DeliveryMode::Mailbox);

        let store =
            FileRelayStore::from_config(&config, Some(PathBuf::from("/tmp/override"))).unwrap();
        assert_eq!(store.dir(), Path::new("/tmp/override"));
    }

    #[test]
    fn test_partial_trailing_line_is_skipped() {
        let content = concat!(
            r#"{"seq":1,"origin":"o","old_value":null,"value":"v","written_at":"2024-06-01T00:00:00Z"}"#,
            "\n",
            r#"{"seq":2,"origin":"o","val"#
        );
        let envelopes = parse_envelopes(content);
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].seq, 1);
    }
}
