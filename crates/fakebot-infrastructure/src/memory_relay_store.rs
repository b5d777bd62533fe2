//! In-process relay store.
//!
//! Peers in the same process (tests, a single binary hosting both sides)
//! share one [`MemoryRelayStore`]. Each key keeps a sequence-numbered log of
//! writes; a `watch` channel wakes observers, which then read the log from
//! their own cursor. In [`DeliveryMode::Mailbox`] the log is truncated to the
//! latest write, so an observer that falls behind only ever sees the newest
//! value. In [`DeliveryMode::Queue`] entries every live observer has read
//! past are dropped; the latest write always stays for `get`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use fakebot_core::relay::{
    ChangeStream, DeliveryMode, OriginId, RelayStore, RelaySubscription, StorageChange,
};
use fakebot_core::Result;
use tokio::sync::{Mutex, watch};

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    origin: OriginId,
    old_value: Option<String>,
    value: String,
}

#[derive(Debug)]
struct KeySlot {
    log: VecDeque<Entry>,
    notify: watch::Sender<u64>,
    /// Cursors of the streams following this key. Dropped streams leave a
    /// dead `Weak` that the next prune discards.
    readers: Vec<Weak<AtomicU64>>,
}

impl KeySlot {
    fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            log: VecDeque::new(),
            notify,
            readers: Vec::new(),
        }
    }

    fn latest_seq(&self) -> u64 {
        self.log.back().map_or(0, |e| e.seq)
    }

    fn register_reader(&mut self) -> Arc<AtomicU64> {
        let cursor = Arc::new(AtomicU64::new(self.latest_seq()));
        self.readers.push(Arc::downgrade(&cursor));
        cursor
    }

    /// Drops entries every live reader has passed, keeping the newest one.
    fn prune(&mut self) {
        self.readers.retain(|reader| reader.strong_count() > 0);
        let floor = self
            .readers
            .iter()
            .filter_map(Weak::upgrade)
            .map(|cursor| cursor.load(Ordering::Acquire))
            .min()
            .unwrap_or_else(|| self.latest_seq());

        while self.log.len() > 1 && self.log.front().is_some_and(|e| e.seq <= floor) {
            self.log.pop_front();
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<String, KeySlot>,
    next_seq: u64,
}

/// Relay store backed by process memory.
#[derive(Debug)]
pub struct MemoryRelayStore {
    mode: DeliveryMode,
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRelayStore {
    pub fn new(mode: DeliveryMode) -> Self {
        Self {
            mode,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Number of values currently retained under `key`.
    pub async fn retained(&self, key: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.slots.get(key).map_or(0, |slot| slot.log.len())
    }
}

impl Default for MemoryRelayStore {
    fn default() -> Self {
        Self::new(DeliveryMode::default())
    }
}

#[async_trait]
impl RelayStore for MemoryRelayStore {
    async fn set(&self, origin: &OriginId, key: &str, value: String) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.next_seq += 1;
        let seq = inner.next_seq;

        let slot = inner
            .slots
            .entry(key.to_string())
            .or_insert_with(KeySlot::new);
        let old_value = slot.log.back().map(|e| e.value.clone());

        if self.mode == DeliveryMode::Mailbox {
            slot.log.clear();
        }
        slot.log.push_back(Entry {
            seq,
            origin: origin.clone(),
            old_value,
            value,
        });
        slot.prune();
        slot.notify.send_replace(seq);

        tracing::trace!("[MemoryRelayStore] {} <- seq {}", key, seq);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .slots
            .get(key)
            .and_then(|slot| slot.log.back())
            .map(|e| e.value.clone()))
    }

    async fn subscribe(&self, observer: &OriginId, key: &str) -> Result<RelaySubscription> {
        let mut inner = self.inner.lock().await;
        let slot = inner
            .slots
            .entry(key.to_string())
            .or_insert_with(KeySlot::new);

        Ok(RelaySubscription::new(MemoryChangeStream {
            inner: Arc::downgrade(&self.inner),
            key: key.to_string(),
            observer: observer.clone(),
            cursor: slot.register_reader(),
            wake: slot.notify.subscribe(),
        }))
    }

    fn delivery_mode(&self) -> DeliveryMode {
        self.mode
    }
}

struct MemoryChangeStream {
    inner: Weak<Mutex<Inner>>,
    key: String,
    observer: OriginId,
    cursor: Arc<AtomicU64>,
    wake: watch::Receiver<u64>,
}

impl MemoryChangeStream {
    /// Advances the cursor past retained entries and returns the first one
    /// written by someone else.
    async fn poll_log(&mut self) -> Option<Option<StorageChange>> {
        let shared = self.inner.upgrade()?;
        let mut inner = shared.lock().await;
        let Some(slot) = inner.slots.get_mut(&self.key) else {
            return Some(None);
        };

        let seen = self.cursor.load(Ordering::Acquire);
        let mut cursor = seen;
        let mut found = None;
        for entry in slot.log.iter().filter(|e| e.seq > seen) {
            cursor = entry.seq;
            if entry.origin != self.observer {
                found = Some(StorageChange {
                    key: self.key.clone(),
                    old_value: entry.old_value.clone(),
                    new_value: Some(entry.value.clone()),
                    origin: entry.origin.clone(),
                });
                break;
            }
        }
        self.cursor.store(cursor, Ordering::Release);
        slot.prune();

        Some(found)
    }
}

#[async_trait]
impl ChangeStream for MemoryChangeStream {
    async fn next_change(&mut self) -> Option<StorageChange> {
        loop {
            // Mark the current version seen before reading, so a write landing
            // after the read still wakes `changed()`.
            self.wake.borrow_and_update();

            if let Some(change) = self.poll_log().await? {
                return Some(change);
            }
            if self.wake.changed().await.is_err() {
                return None;
            }
        }
    }
}
