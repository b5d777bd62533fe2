//! Cross-peer message relay.
//!
//! Two peers (counselor and client) exchange messages through a shared
//! [`RelayStore`], each writing to its own key and listening on the other's.
//!
//! # Module Structure
//!
//! - `key`: `SessionId`, `PeerRole`, `Direction`, `RelayKey`
//! - `store`: `RelayStore` trait, change notifications, `DeliveryMode`
//! - `wire`: JSON framing of messages
//! - `peer`: Per-peer state machine (`RelayPeer`)
//! - `channel`: Session-scoped publish/subscribe (`SessionChannel`)

mod channel;
mod key;
mod peer;
mod store;
pub mod wire;

pub use channel::{SessionChannel, SessionReceiver};
pub use key::{Direction, PeerRole, RelayKey, SessionId};
pub use peer::{Outbound, PeerState, RelayPeer};
pub use store::{
    ChangeStream, DeliveryMode, OriginId, RelayStore, RelaySubscription, StorageChange,
};
