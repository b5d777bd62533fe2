use std::sync::{Arc, Mutex};
use std::time::Duration;

use fakebot_core::relay::{
    DeliveryMode, PeerRole, PeerState, RelayPeer, RelayStore, SessionChannel, SessionId,
};
use fakebot_core::MessageRole;
use fakebot_infrastructure::{FileRelayStore, MemoryRelayStore};
use tempfile::TempDir;
use tokio::time::timeout;

fn session(raw: &str) -> SessionId {
    SessionId::new(raw).unwrap()
}

fn channel_for(store: &Arc<dyn RelayStore>, peer: &RelayPeer) -> SessionChannel {
    SessionChannel::new(
        store.clone(),
        peer.session().clone(),
        peer.role(),
        peer.origin().clone(),
    )
}

/// Counselor sends two messages before the client gets to look.
async fn send_two_before_reading(mode: DeliveryMode) -> (RelayPeer, Vec<String>) {
    let store: Arc<dyn RelayStore> = Arc::new(MemoryRelayStore::new(mode));
    let mut counselor = RelayPeer::new(PeerRole::Counselor, session("7"));
    let client = RelayPeer::new(PeerRole::Client, session("7"));

    let counselor_channel = channel_for(&store, &counselor);
    let mut receiver = channel_for(&store, &client).subscribe().await.unwrap();

    for text in ["M1", "M2"] {
        let outbound = counselor.compose(text).unwrap();
        counselor_channel.send_payload(outbound.payload).await.unwrap();
    }

    let mut seen = Vec::new();
    while let Ok(Some(message)) = timeout(Duration::from_millis(50), receiver.recv_message()).await
    {
        seen.push(message.content);
    }
    (counselor, seen)
}

#[tokio::test]
async fn test_mailbox_observer_sees_only_latest() {
    let (counselor, seen) = send_two_before_reading(DeliveryMode::Mailbox).await;

    assert_eq!(seen, vec!["M2"]);
    let sent: Vec<_> = counselor
        .transcript()
        .messages()
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(sent, vec!["M1", "M2"]);
}

#[tokio::test]
async fn test_queue_observer_sees_every_message_in_order() {
    let (_, seen) = send_two_before_reading(DeliveryMode::Queue).await;
    assert_eq!(seen, vec!["M1", "M2"]);
}

#[tokio::test]
async fn test_counselor_greeting_reaches_client_once() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<dyn RelayStore> = Arc::new(FileRelayStore::new(
        temp_dir.path(),
        DeliveryMode::Queue,
        Duration::from_millis(10),
    ));

    let mut counselor = RelayPeer::new(PeerRole::Counselor, session("42"));
    let mut client = RelayPeer::new(PeerRole::Client, session("42"));
    let mut receiver = channel_for(&store, &client).subscribe().await.unwrap();

    client.compose("도와주세요").unwrap();
    assert_eq!(client.state(), PeerState::AwaitingReply);

    let outbound = counselor.compose("안녕하세요").unwrap();
    channel_for(&store, &counselor)
        .send_payload(outbound.payload)
        .await
        .unwrap();

    let change = timeout(Duration::from_secs(2), receiver.recv())
        .await
        .unwrap()
        .unwrap();
    let received = client.handle_change(&change).unwrap();
    assert_eq!(received.role, MessageRole::Assistant);
    assert_eq!(received.content, "안녕하세요");
    assert_eq!(client.state(), PeerState::Idle);

    assert!(timeout(Duration::from_millis(100), receiver.recv()).await.is_err());
    let remote: Vec<_> = client
        .transcript()
        .messages()
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .collect();
    assert_eq!(remote.len(), 1);
}

#[tokio::test]
async fn test_on_receive_handler_gets_decoded_messages() {
    let store: Arc<dyn RelayStore> = Arc::new(MemoryRelayStore::default());
    let client = RelayPeer::new(PeerRole::Client, session("9"));
    let mut counselor = RelayPeer::new(PeerRole::Counselor, session("9"));

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let task = channel_for(&store, &client)
        .on_receive(move |message| sink.lock().unwrap().push(message))
        .await
        .unwrap();

    let counselor_channel = channel_for(&store, &counselor);
    counselor_channel
        .send_payload("{not json".to_string())
        .await
        .unwrap();
    let outbound = counselor.compose("괜찮아요").unwrap();
    counselor_channel.send(&outbound.message).await.unwrap();

    timeout(Duration::from_secs(1), async {
        while received.lock().unwrap().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    task.abort();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].content, "괜찮아요");
    assert_eq!(received[0].id, outbound.message.id);
}

#[tokio::test]
async fn test_blank_input_writes_nothing() {
    let memory = Arc::new(MemoryRelayStore::default());
    let store: Arc<dyn RelayStore> = memory.clone();

    for role in [PeerRole::Counselor, PeerRole::Client] {
        let mut peer = RelayPeer::new(role, session("5"));
        let channel = channel_for(&store, &peer);

        for text in ["", "   ", "\n\t"] {
            let err = peer.compose(text).unwrap_err();
            assert!(err.is_empty_message());
        }
        assert!(peer.transcript().is_empty());
        assert_eq!(memory.retained(&channel.outbound_key().to_string()).await, 0);
    }
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let store: Arc<dyn RelayStore> = Arc::new(MemoryRelayStore::default());
    let mut counselor = RelayPeer::new(PeerRole::Counselor, session("1"));
    let other_client = RelayPeer::new(PeerRole::Client, session("2"));

    let mut receiver = channel_for(&store, &other_client).subscribe().await.unwrap();
    let outbound = counselor.compose("세션 1 전용").unwrap();
    channel_for(&store, &counselor)
        .send_payload(outbound.payload)
        .await
        .unwrap();

    assert!(timeout(Duration::from_millis(50), receiver.recv()).await.is_err());
}
