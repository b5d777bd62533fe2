//! Session identifiers, peer roles and relay key naming.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{FakebotError, Result};
use crate::message::MessageRole;

const MAX_SESSION_ID_LEN: usize = 64;

/// Opaque session namespace shared by a counselor and a client peer.
///
/// Restricted to ASCII letters, digits, `-` and `_` so it is safe in
/// addresses, relay keys and file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validates and wraps a caller-supplied identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(FakebotError::invalid_session("session id is empty"));
        }
        if raw.len() > MAX_SESSION_ID_LEN {
            return Err(FakebotError::invalid_session(format!(
                "session id is longer than {} characters",
                MAX_SESSION_ID_LEN
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(FakebotError::invalid_session(format!(
                "session id '{}' contains unsupported character {:?}",
                raw, bad
            )));
        }
        Ok(Self(raw))
    }

    /// A fresh identifier from the current time in milliseconds.
    pub fn generate() -> Self {
        Self(Utc::now().timestamp_millis().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = FakebotError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = FakebotError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

/// Which side of a counseling session a peer plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerRole {
    /// Types replies that the client sees as the AI's.
    Counselor,
    /// Believes they are chatting with an AI.
    Client,
}

impl PeerRole {
    /// The role this peer's own messages carry.
    pub fn local_role(&self) -> MessageRole {
        match self {
            Self::Counselor => MessageRole::Assistant,
            Self::Client => MessageRole::User,
        }
    }

    /// The role of messages arriving from the counterpart.
    pub fn remote_role(&self) -> MessageRole {
        self.counterpart().local_role()
    }

    pub fn counterpart(&self) -> PeerRole {
        match self {
            Self::Counselor => Self::Client,
            Self::Client => Self::Counselor,
        }
    }

    /// Direction of this peer's outgoing messages.
    pub fn outbound(&self) -> Direction {
        match self {
            Self::Counselor => Direction::CounselorToClient,
            Self::Client => Direction::ClientToCounselor,
        }
    }

    /// Direction this peer listens on.
    pub fn inbound(&self) -> Direction {
        self.counterpart().outbound()
    }

    /// Path segment used in peer addresses.
    pub fn route_segment(&self) -> &'static str {
        match self {
            Self::Counselor => "counselor",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for PeerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_segment())
    }
}

/// Flow direction of a relay entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    ClientToCounselor,
    CounselorToClient,
}

impl Direction {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ClientToCounselor => "client_message",
            Self::CounselorToClient => "counselor_message",
        }
    }

    const ALL: [Direction; 2] = [Self::ClientToCounselor, Self::CounselorToClient];
}

/// A relay slot: `<direction-tag>_<session-id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelayKey {
    pub direction: Direction,
    pub session: SessionId,
}

impl RelayKey {
    pub fn new(direction: Direction, session: SessionId) -> Self {
        Self { direction, session }
    }

    /// Parses a store key back into direction and session.
    ///
    /// Returns `None` for keys that are not relay keys.
    pub fn parse(key: &str) -> Option<Self> {
        Direction::ALL.iter().find_map(|direction| {
            let rest = key.strip_prefix(direction.tag())?.strip_prefix('_')?;
            let session = SessionId::new(rest).ok()?;
            Some(Self::new(*direction, session))
        })
    }
}

impl fmt::Display for RelayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.direction.tag(), self.session)
    }
}
