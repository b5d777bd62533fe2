//! Session-scoped publish/subscribe over a [`RelayStore`].

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::key::{PeerRole, RelayKey, SessionId};
use super::store::{DeliveryMode, OriginId, RelayStore, RelaySubscription, StorageChange};
use super::wire;
use crate::error::Result;
use crate::message::Message;

/// One peer's view of a session: sends on its outbound key, receives on the
/// counterpart's.
#[derive(Clone)]
pub struct SessionChannel {
    store: Arc<dyn RelayStore>,
    session: SessionId,
    role: PeerRole,
    origin: OriginId,
}

impl SessionChannel {
    pub fn new(
        store: Arc<dyn RelayStore>,
        session: SessionId,
        role: PeerRole,
        origin: OriginId,
    ) -> Self {
        Self {
            store,
            session,
            role,
            origin,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub fn origin(&self) -> &OriginId {
        &self.origin
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.store.delivery_mode()
    }

    pub fn outbound_key(&self) -> RelayKey {
        RelayKey::new(self.role.outbound(), self.session.clone())
    }

    pub fn inbound_key(&self) -> RelayKey {
        RelayKey::new(self.role.inbound(), self.session.clone())
    }

    /// Publishes a message to the counterpart. Fire-and-forget.
    pub async fn send(&self, message: &Message) -> Result<()> {
        self.send_payload(wire::encode(message)?).await
    }

    /// Publishes an already encoded payload.
    pub async fn send_payload(&self, payload: String) -> Result<()> {
        let key = self.outbound_key().to_string();
        tracing::debug!("[Relay] {} writes {}", self.role, key);
        self.store.set(&self.origin, &key, payload).await
    }

    /// Starts following the counterpart's messages.
    pub async fn subscribe(&self) -> Result<SessionReceiver> {
        let key = self.inbound_key().to_string();
        let subscription = self.store.subscribe(&self.origin, &key).await?;
        Ok(SessionReceiver {
            subscription,
            key,
            role: self.role,
        })
    }

    /// Calls `handler` for every decodable counterpart message.
    ///
    /// Runs until the store goes away or the returned task is aborted.
    pub async fn on_receive<F>(&self, mut handler: F) -> Result<JoinHandle<()>>
    where
        F: FnMut(Message) + Send + 'static,
    {
        let mut receiver = self.subscribe().await?;
        Ok(tokio::spawn(async move {
            while let Some(message) = receiver.recv_message().await {
                handler(message);
            }
        }))
    }
}

/// Inbound half of a [`SessionChannel`].
#[derive(Debug)]
pub struct SessionReceiver {
    subscription: RelaySubscription,
    key: String,
    role: PeerRole,
}

impl SessionReceiver {
    /// Next raw change on the inbound key.
    pub async fn recv(&mut self) -> Option<StorageChange> {
        loop {
            let change = self.subscription.recv().await?;
            if change.key == self.key {
                return Some(change);
            }
        }
    }

    /// Next decodable message, skipping malformed payloads.
    pub async fn recv_message(&mut self) -> Option<Message> {
        loop {
            let change = self.recv().await?;
            if let Some(message) = change
                .new_value
                .as_deref()
                .and_then(|payload| wire::decode(payload, self.role.remote_role()))
            {
                return Some(message);
            }
        }
    }
}
