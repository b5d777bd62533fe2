//! Persona chat use case: wraps a [`ChatSession`] with reply timers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fakebot_core::chat::{ChatSession, ResponseMode, SubmitOutcome};
use fakebot_core::config::{AppConfig, ChatConfig};
use fakebot_core::persona::{PersonaKind, PersonaProfile, PersonaResponder};
use fakebot_core::random::RandomSource;
use fakebot_core::tarot::{SPREAD_SIZE, TarotDeck};
use fakebot_core::{Message, Result, Transcript, TranscriptLabels};
use fakebot_infrastructure::{ExportTag, TranscriptExporter};
use tokio::sync::{Mutex, mpsc};

/// Bounds of the simulated "AI is typing" pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseDelay {
    pub min: Duration,
    pub max: Duration,
}

impl ResponseDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Fires replies right away.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(
            Duration::from_millis(config.response_delay_min_ms),
            Duration::from_millis(config.response_delay_max_ms),
        )
    }

    /// Uniform pick in `min..=max`, millisecond resolution.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Duration {
        let low = self.min.as_millis() as u64;
        let high = self.max.as_millis() as u64;
        Duration::from_millis(rng.next_in_range(low, high))
    }
}

impl Default for ResponseDelay {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Something the operator should see without having asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A scheduled scripted reply was appended.
    Reply(Message),
}

/// Drives one persona chat.
///
/// Scripted replies are scheduled on the tokio runtime and always fire; the
/// operator can keep typing meanwhile. Each fired reply is also sent as a
/// [`ChatEvent`].
pub struct ChatService {
    session: Arc<Mutex<ChatSession>>,
    responder: Arc<PersonaResponder>,
    rng: Arc<Mutex<Box<dyn RandomSource>>>,
    delay: ResponseDelay,
    events: mpsc::UnboundedSender<ChatEvent>,
}

impl ChatService {
    pub fn new(
        session: ChatSession,
        responder: PersonaResponder,
        rng: Box<dyn RandomSource>,
        delay: ResponseDelay,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let service = Self {
            session: Arc::new(Mutex::new(session)),
            responder: Arc::new(responder),
            rng: Arc::new(Mutex::new(rng)),
            delay,
            events,
        };
        (service, receiver)
    }

    /// Builds a chat with `kind` using persona overrides and delays from
    /// `config`.
    pub fn from_config(
        kind: PersonaKind,
        config: &AppConfig,
        deck: Option<TarotDeck>,
        rng: Box<dyn RandomSource>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ChatEvent>)> {
        let responder = config.responder()?;
        let session = ChatSession::with_deck(responder.profile(kind).clone(), deck);
        tracing::info!("[ChatService] Starting chat with {}", kind);
        Ok(Self::new(
            session,
            responder,
            rng,
            ResponseDelay::from_config(&config.chat),
        ))
    }

    /// Handles one line of operator input.
    ///
    /// In automatic mode a reply is scheduled and this returns at once.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome> {
        let outcome = self.session.lock().await.submit(text)?;

        if let SubmitOutcome::AwaitingGenerated { message } = &outcome {
            self.schedule_reply(message.content.clone()).await;
        }
        Ok(outcome)
    }

    async fn schedule_reply(&self, input: String) {
        let delay = {
            let mut rng = self.rng.lock().await;
            self.delay.sample(&mut **rng)
        };
        tracing::debug!("[ChatService] Reply scheduled in {:?}", delay);

        let session = self.session.clone();
        let responder = self.responder.clone();
        let rng = self.rng.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let text = {
                let kind = session.lock().await.persona();
                let mut rng = rng.lock().await;
                responder.respond(kind, &input, &mut **rng).to_string()
            };
            let message = session.lock().await.append_generated(text).clone();

            // Nobody listening is fine; the reply is in the transcript.
            let _ = events.send(ChatEvent::Reply(message));
        });
    }

    pub async fn mode(&self) -> ResponseMode {
        self.session.lock().await.mode()
    }

    pub async fn set_mode(&self, mode: ResponseMode) {
        self.session.lock().await.set_mode(mode);
        tracing::info!("[ChatService] Mode set to {}", mode.label());
    }

    pub async fn toggle_mode(&self) -> ResponseMode {
        let mode = self.session.lock().await.toggle_mode();
        tracing::info!("[ChatService] Mode set to {}", mode.label());
        mode
    }

    pub async fn is_typing(&self) -> bool {
        self.session.lock().await.is_typing()
    }

    pub async fn pending(&self) -> Option<Message> {
        self.session.lock().await.pending().cloned()
    }

    pub async fn persona(&self) -> PersonaKind {
        self.session.lock().await.persona()
    }

    pub async fn profile(&self) -> PersonaProfile {
        self.session.lock().await.profile().clone()
    }

    pub async fn transcript(&self) -> Transcript {
        self.session.lock().await.transcript().clone()
    }

    pub async fn draw_tarot(&self) -> Result<[usize; SPREAD_SIZE]> {
        let mut rng = self.rng.lock().await;
        self.session.lock().await.draw_tarot(&mut **rng)
    }

    pub async fn reveal_tarot(&self) -> Result<Message> {
        Ok(self.session.lock().await.reveal_tarot()?.clone())
    }

    pub async fn reset_tarot(&self) -> Result<()> {
        self.session.lock().await.reset_tarot()
    }

    pub async fn export_text(&self) -> String {
        self.session.lock().await.export_text()
    }

    /// Writes the transcript as `AI_Chat_<persona>_<millis>.txt`.
    pub async fn export(&self, exporter: &TranscriptExporter) -> Result<PathBuf> {
        let (kind, name, transcript) = {
            let session = self.session.lock().await;
            (
                session.persona(),
                session.profile().name.clone(),
                session.transcript().clone(),
            )
        };
        exporter
            .export(
                ExportTag::Persona(kind),
                &transcript,
                &TranscriptLabels::for_persona(&name),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fakebot_core::MessageRole;
    use fakebot_core::random::ScriptedRandom;
    use tokio::time::timeout;

    fn service(
        kind: PersonaKind,
        script: Vec<usize>,
    ) -> (ChatService, mpsc::UnboundedReceiver<ChatEvent>) {
        let responder = PersonaResponder::with_defaults();
        let session = ChatSession::new(responder.profile(kind).clone());
        ChatService::new(
            session,
            responder,
            Box::new(ScriptedRandom::new(script)),
            ResponseDelay::immediate(),
        )
    }

    #[test]
    fn test_delay_sample_stays_in_bounds() {
        let delay = ResponseDelay::default();
        let mut rng = ScriptedRandom::new(vec![0, 1000, 5000]);
        for _ in 0..3 {
            let sampled = delay.sample(&mut rng);
            assert!(sampled >= Duration::from_millis(1500));
            assert!(sampled <= Duration::from_millis(2500));
        }
    }

    #[tokio::test]
    async fn test_automatic_reply_is_one_of_persona_responses() {
        let (service, mut events) = service(PersonaKind::Character, vec![2]);

        let outcome = service.submit("안녕").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::AwaitingGenerated { .. }));

        let ChatEvent::Reply(reply) = timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);

        let responder = PersonaResponder::with_defaults();
        assert!(
            responder
                .profile(PersonaKind::Character)
                .responses
                .contains(&reply.content)
        );
        assert!(!service.is_typing().await);
        assert_eq!(service.transcript().await.len(), 3);
    }

    #[tokio::test]
    async fn test_manual_mode_waits_for_operator() {
        let (service, mut events) = service(PersonaKind::Counselor, vec![0]);
        service.set_mode(ResponseMode::Manual).await;

        service.submit("힘들어요").await.unwrap();
        assert!(service.is_typing().await);
        assert_eq!(service.pending().await.unwrap().content, "힘들어요");

        let outcome = service.submit("그랬군요").await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::ManualReply { .. }));
        assert_eq!(outcome.message().role, MessageRole::Assistant);
        assert!(!service.is_typing().await);

        assert!(
            timeout(Duration::from_millis(50), events.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_blank_submit_schedules_nothing() {
        let (service, mut events) = service(PersonaKind::Professional, vec![0]);

        assert!(service.submit("   ").await.unwrap_err().is_empty_message());
        assert_eq!(service.transcript().await.len(), 1);
        assert!(
            timeout(Duration::from_millis(50), events.recv())
                .await
                .is_err()
        );
    }
}
