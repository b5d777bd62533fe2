//! Per-peer relay state machine.

use serde::{Deserialize, Serialize};

use super::key::{PeerRole, RelayKey, SessionId};
use super::store::{OriginId, StorageChange};
use super::wire;
use crate::error::{FakebotError, Result};
use crate::message::{Message, is_blank};
use crate::transcript::{Transcript, TranscriptLabels};

/// Conversation state of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerState {
    #[default]
    Idle,
    /// The client sent something and no counselor message has arrived since.
    AwaitingReply,
}

/// A composed message ready to be written to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub key: RelayKey,
    pub payload: String,
    pub message: Message,
}

/// One side (counselor or client) of a relayed session.
///
/// Pure state: the caller writes [`Outbound`] payloads to a store and feeds
/// observed [`StorageChange`]s back in.
#[derive(Debug, Clone)]
pub struct RelayPeer {
    role: PeerRole,
    session: SessionId,
    origin: OriginId,
    transcript: Transcript,
    state: PeerState,
    /// Counselor side: latest client message not yet answered.
    pending: Option<Message>,
}

impl RelayPeer {
    pub fn new(role: PeerRole, session: SessionId) -> Self {
        Self::with_origin(role, session, OriginId::generate())
    }

    pub fn with_origin(role: PeerRole, session: SessionId, origin: OriginId) -> Self {
        Self {
            role,
            session,
            origin,
            transcript: Transcript::new(),
            state: PeerState::Idle,
            pending: None,
        }
    }

    /// Seeds the transcript with the AI greeting both sides show on open.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.transcript.push(Message::assistant(greeting));
        self
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn origin(&self) -> &OriginId {
        &self.origin
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn pending(&self) -> Option<&Message> {
        self.pending.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn inbound_key(&self) -> RelayKey {
        RelayKey::new(self.role.inbound(), self.session.clone())
    }

    pub fn outbound_key(&self) -> RelayKey {
        RelayKey::new(self.role.outbound(), self.session.clone())
    }

    /// Creates and records a local message, returning what to write.
    ///
    /// # Errors
    ///
    /// [`FakebotError::EmptyMessage`] for blank input; state is untouched.
    pub fn compose(&mut self, text: &str) -> Result<Outbound> {
        if is_blank(text) {
            return Err(FakebotError::EmptyMessage);
        }

        let message = Message::new(self.role.local_role(), text);
        let payload = wire::encode(&message)?;
        self.transcript.push(message.clone());

        match self.role {
            PeerRole::Client => self.state = PeerState::AwaitingReply,
            PeerRole::Counselor => self.pending = None,
        }

        Ok(Outbound {
            key: self.outbound_key(),
            payload,
            message,
        })
    }

    /// Applies an observed store change.
    ///
    /// Returns the appended message, or `None` if the change was not for this
    /// peer or its payload was unusable.
    pub fn handle_change(&mut self, change: &StorageChange) -> Option<&Message> {
        if change.origin == self.origin {
            return None;
        }
        if RelayKey::parse(&change.key).as_ref() != Some(&self.inbound_key()) {
            return None;
        }
        let payload = change.new_value.as_deref()?;
        self.accept_payload(payload)
    }

    /// Applies a raw inbound payload already known to be for this peer.
    pub fn accept_payload(&mut self, payload: &str) -> Option<&Message> {
        let message = wire::decode(payload, self.role.remote_role())?;

        if self.state == PeerState::AwaitingReply {
            self.state = PeerState::Idle;
        }
        if self.role == PeerRole::Counselor {
            self.pending = Some(message.clone());
        }

        tracing::debug!(
            "[Relay] {} peer on session {} received message {}",
            self.role,
            self.session,
            message.id
        );
        Some(self.transcript.push(message))
    }

    /// Downloadable transcript text with counseling labels.
    pub fn export_text(&self) -> String {
        self.transcript.export_text(&TranscriptLabels::counseling())
    }
}
