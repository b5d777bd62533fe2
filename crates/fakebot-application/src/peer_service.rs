//! Counselor/client use case over a relay store.

use std::path::PathBuf;
use std::sync::Arc;

use fakebot_core::relay::{PeerRole, PeerState, RelayPeer, RelayStore, SessionChannel, SessionId};
use fakebot_core::route::PeerRoute;
use fakebot_core::{Message, Result, Transcript, TranscriptLabels};
use fakebot_infrastructure::{ExportTag, TranscriptExporter};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// Something that arrived from the other side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// A counterpart message was accepted into the transcript.
    Received(Message),
}

/// One side of a relayed counseling session.
///
/// Owns the peer state and a listener task following the counterpart's key.
/// Dropping the service stops the listener.
pub struct PeerService {
    peer: Arc<Mutex<RelayPeer>>,
    channel: SessionChannel,
    listener: JoinHandle<()>,
}

impl PeerService {
    /// Joins `session` as `role`, seeding the transcript with `greeting`.
    ///
    /// Only messages written after this returns are observed.
    pub async fn start(
        store: Arc<dyn RelayStore>,
        role: PeerRole,
        session: SessionId,
        greeting: impl Into<String>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PeerEvent>)> {
        let peer = RelayPeer::new(role, session.clone()).with_greeting(greeting);
        let channel = SessionChannel::new(store, session, role, peer.origin().clone());
        let mut receiver = channel.subscribe().await?;

        let peer = Arc::new(Mutex::new(peer));
        let (events, event_receiver) = mpsc::unbounded_channel();

        let listener_peer = peer.clone();
        let listener = tokio::spawn(async move {
            while let Some(change) = receiver.recv().await {
                let mut peer = listener_peer.lock().await;
                if let Some(message) = peer.handle_change(&change) {
                    let _ = events.send(PeerEvent::Received(message.clone()));
                }
            }
            tracing::debug!("[PeerService] Relay subscription closed");
        });

        tracing::info!(
            "[PeerService] {} joined session {} ({:?} delivery)",
            role,
            channel.session(),
            channel.delivery_mode()
        );

        Ok((
            Self {
                peer,
                channel,
                listener,
            },
            event_receiver,
        ))
    }

    pub fn role(&self) -> PeerRole {
        self.channel.role()
    }

    pub fn session(&self) -> &SessionId {
        self.channel.session()
    }

    pub fn route(&self) -> PeerRoute {
        PeerRoute::new(self.role(), self.session().clone())
    }

    /// Address to hand to the other participant.
    pub fn counterpart_url(&self, origin: &str) -> String {
        self.route().counterpart().url(origin)
    }

    /// Records `text` locally and publishes it to the counterpart.
    ///
    /// # Errors
    ///
    /// Blank text is rejected before anything is recorded or written.
    pub async fn send(&self, text: &str) -> Result<Message> {
        let mut peer = self.peer.lock().await;
        let outbound = peer.compose(text)?;
        self.channel.send_payload(outbound.payload).await?;
        Ok(outbound.message)
    }

    pub async fn state(&self) -> PeerState {
        self.peer.lock().await.state()
    }

    pub async fn pending(&self) -> Option<Message> {
        self.peer.lock().await.pending().cloned()
    }

    pub async fn transcript(&self) -> Transcript {
        self.peer.lock().await.transcript().clone()
    }

    pub async fn export_text(&self) -> String {
        self.peer.lock().await.export_text()
    }

    /// Writes the transcript as `심리상담_기록_<session>_<millis>.txt`.
    pub async fn export(&self, exporter: &TranscriptExporter) -> Result<PathBuf> {
        let transcript = self.transcript().await;
        exporter
            .export(
                ExportTag::Counseling(self.session()),
                &transcript,
                &TranscriptLabels::counseling(),
            )
            .await
    }

    /// Stops following the counterpart.
    pub fn shutdown(&self) {
        self.listener.abort();
        tracing::info!(
            "[PeerService] {} left session {}",
            self.role(),
            self.session()
        );
    }
}

impl Drop for PeerService {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
