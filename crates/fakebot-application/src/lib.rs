//! Application layer for fakebot.
//!
//! Use cases that put the core state machines on the tokio runtime: reply
//! timers for persona chats and the relay listener for counseling peers.

pub mod chat_service;
pub mod peer_service;

pub use chat_service::{ChatEvent, ChatService, ResponseDelay};
pub use peer_service::{PeerEvent, PeerService};
