//! Shared key-value relay store abstraction.
//!
//! A [`RelayStore`] is the only channel between peers. Writes are atomic per
//! key. Observers receive change notifications only for writes made by
//! *other* origins, mirroring how a browser delivers storage events to every
//! tab except the writer.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// How many unobserved values a key retains per observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Only the latest value survives. An observer that has not caught up
    /// when a second write lands never sees the first one.
    Mailbox,
    /// Every value is kept in write order and delivered to each observer.
    #[default]
    Queue,
}

/// Identity of a writer/observer (one per peer instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(String);

impl OriginId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A change notification for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Who wrote it. Never the observer itself.
    pub origin: OriginId,
}

/// Pull side of a subscription.
///
/// Pull-based: nothing may buffer values for the observer, or a mailbox
/// store could not drop superseded ones.
#[async_trait]
pub trait ChangeStream: Send {
    /// Waits for the next change. `None` once the store is gone.
    async fn next_change(&mut self) -> Option<StorageChange>;
}

/// Change notifications for one key, as seen by one observer.
pub struct RelaySubscription {
    inner: Box<dyn ChangeStream>,
}

impl RelaySubscription {
    pub fn new(stream: impl ChangeStream + 'static) -> Self {
        Self {
            inner: Box::new(stream),
        }
    }

    pub async fn recv(&mut self) -> Option<StorageChange> {
        self.inner.next_change().await
    }
}

impl fmt::Debug for RelaySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySubscription").finish_non_exhaustive()
    }
}

/// A shared key-value store whose changes other observers can follow.
///
/// # Implementation Notes
///
/// Implementations must:
/// - apply each `set` atomically
/// - never notify an observer about its own writes
/// - only report changes made after `subscribe` returned
/// - honor their [`DeliveryMode`]
#[async_trait]
pub trait RelayStore: Send + Sync {
    /// Writes `value` under `key` on behalf of `origin`.
    async fn set(&self, origin: &OriginId, key: &str, value: String) -> Result<()>;

    /// Latest value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Follows changes to `key` made by origins other than `observer`.
    async fn subscribe(&self, observer: &OriginId, key: &str) -> Result<RelaySubscription>;

    fn delivery_mode(&self) -> DeliveryMode;
}
