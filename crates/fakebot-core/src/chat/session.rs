//! Chat state machine for one operator and one persona.

use super::mode::ResponseMode;
use crate::error::{FakebotError, Result};
use crate::message::{Message, is_blank};
use crate::persona::{PersonaKind, PersonaProfile};
use crate::random::RandomSource;
use crate::tarot::{SPREAD_SIZE, TarotDeck, TarotReading, TarotSpread};
use crate::transcript::{Transcript, TranscriptLabels};

/// What the caller must do after a successful [`ChatSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// User message appended; a scripted reply should be scheduled.
    AwaitingGenerated { message: Message },
    /// User message appended and held until the operator replies by hand.
    AwaitingManual { message: Message },
    /// The text was the operator's manual reply, appended as the AI's.
    ManualReply { message: Message },
}

impl SubmitOutcome {
    pub fn message(&self) -> &Message {
        match self {
            Self::AwaitingGenerated { message }
            | Self::AwaitingManual { message }
            | Self::ManualReply { message } => message,
        }
    }
}

/// A persona chat: transcript, reply mode and the manual-reply slot.
///
/// The session is a plain state machine. Timers live in the application
/// layer, which calls [`ChatSession::append_generated`] when a scheduled
/// reply fires.
#[derive(Debug, Clone)]
pub struct ChatSession {
    profile: PersonaProfile,
    transcript: Transcript,
    mode: ResponseMode,
    /// Counterpart message awaiting a manual reply.
    pending: Option<Message>,
    /// Scheduled scripted replies that have not fired yet.
    outstanding: usize,
    spread: Option<TarotSpread>,
}

impl ChatSession {
    /// Starts a chat, seeding the transcript with the persona's greeting.
    pub fn new(profile: PersonaProfile) -> Self {
        Self::with_deck(profile, None)
    }

    /// Starts a chat with an explicit tarot deck (classic when `None`).
    ///
    /// The deck is ignored for non-tarot personas.
    pub fn with_deck(profile: PersonaProfile, deck: Option<TarotDeck>) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Message::assistant(profile.greeting.clone()));

        let spread = match profile.kind {
            PersonaKind::Tarot => Some(TarotSpread::new(deck.unwrap_or_default())),
            _ => None,
        };

        Self {
            profile,
            transcript,
            mode: ResponseMode::default(),
            pending: None,
            outstanding: 0,
            spread,
        }
    }

    pub fn profile(&self) -> &PersonaProfile {
        &self.profile
    }

    pub fn persona(&self) -> PersonaKind {
        self.profile.kind
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    /// Switches reply mode. Leaving manual mode drops the pending message.
    pub fn set_mode(&mut self, mode: ResponseMode) {
        if mode == ResponseMode::Automatic {
            self.pending = None;
        }
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> ResponseMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn pending(&self) -> Option<&Message> {
        self.pending.as_ref()
    }

    /// True while a reply is outstanding (typing indicator).
    pub fn is_typing(&self) -> bool {
        self.outstanding > 0 || self.pending.is_some()
    }

    /// Handles one line of operator input.
    ///
    /// In manual mode with a pending message the text is the AI's reply;
    /// otherwise it is the user's message.
    ///
    /// # Errors
    ///
    /// [`FakebotError::EmptyMessage`] for blank input; nothing is appended.
    pub fn submit(&mut self, text: &str) -> Result<SubmitOutcome> {
        if is_blank(text) {
            return Err(FakebotError::EmptyMessage);
        }

        if self.mode == ResponseMode::Manual && self.pending.is_some() {
            let message = self.reply_as_assistant(text)?.clone();
            return Ok(SubmitOutcome::ManualReply { message });
        }

        let message = self.transcript.push(Message::user(text)).clone();
        match self.mode {
            ResponseMode::Automatic => {
                self.outstanding += 1;
                Ok(SubmitOutcome::AwaitingGenerated { message })
            }
            ResponseMode::Manual => {
                self.pending = Some(message.clone());
                Ok(SubmitOutcome::AwaitingManual { message })
            }
        }
    }

    /// Appends operator-typed text verbatim as the AI's message.
    ///
    /// # Errors
    ///
    /// [`FakebotError::EmptyMessage`] for blank input; nothing is appended.
    pub fn reply_as_assistant(&mut self, text: &str) -> Result<&Message> {
        if is_blank(text) {
            return Err(FakebotError::EmptyMessage);
        }
        self.pending = None;
        Ok(self.transcript.push(Message::assistant(text)))
    }

    /// Appends a scripted reply whose timer fired.
    ///
    /// Scheduled replies are never cancelled, so this always appends.
    pub fn append_generated(&mut self, text: impl Into<String>) -> &Message {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.transcript.push(Message::assistant(text))
    }

    /// Draws a tarot spread (tarot persona only).
    pub fn draw_tarot<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<[usize; SPREAD_SIZE]> {
        Ok(self.spread_mut()?.select(rng))
    }

    /// Reveals the drawn spread and appends it as one AI message.
    pub fn reveal_tarot(&mut self) -> Result<&Message> {
        let reading = self.spread_mut()?.reveal()?;
        Ok(self.append_reading(&reading))
    }

    /// Appends a revealed reading as a single AI message.
    pub fn append_reading(&mut self, reading: &TarotReading) -> &Message {
        self.transcript
            .push(Message::assistant(reading.to_message_text()))
    }

    /// Puts the drawn cards back.
    pub fn reset_tarot(&mut self) -> Result<()> {
        self.spread_mut()?.reset();
        Ok(())
    }

    pub fn spread(&self) -> Option<&TarotSpread> {
        self.spread.as_ref()
    }

    fn spread_mut(&mut self) -> Result<&mut TarotSpread> {
        let kind = self.profile.kind;
        self.spread.as_mut().ok_or_else(|| {
            FakebotError::config(format!(
                "tarot cards are only available to the tarot persona, not '{}'",
                kind
            ))
        })
    }

    /// Downloadable transcript text labelled with the persona name.
    pub fn export_text(&self) -> String {
        self.transcript
            .export_text(&TranscriptLabels::for_persona(&self.profile.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRole;
    use crate::persona::PersonaResponder;
    use crate::random::ScriptedRandom;

    fn session(kind: PersonaKind) -> ChatSession {
        ChatSession::new(PersonaResponder::with_defaults().profile(kind).clone())
    }

    #[test]
    fn test_new_session_starts_with_greeting() {
        let chat = session(PersonaKind::Character);
        assert_eq!(chat.transcript().len(), 1);
        let greeting = chat.transcript().last().unwrap();
        assert_eq!(greeting.role, MessageRole::Assistant);
        assert_eq!(greeting.content, chat.profile().greeting);
        assert!(!chat.is_typing());
    }

    #[test]
    fn test_blank_input_is_rejected_in_both_modes() {
        for mode in [ResponseMode::Automatic, ResponseMode::Manual] {
            let mut chat = session(PersonaKind::Counselor);
            chat.set_mode(mode);
            for blank in ["", "   ", "\n\t"] {
                assert!(chat.submit(blank).unwrap_err().is_empty_message());
            }
            assert_eq!(chat.transcript().len(), 1);
            assert!(!chat.is_typing());
        }

        let mut chat = session(PersonaKind::Counselor);
        chat.set_mode(ResponseMode::Manual);
        chat.submit("고민이 있어요").unwrap();
        assert!(chat.submit("  ").unwrap_err().is_empty_message());
        assert!(chat.reply_as_assistant("").unwrap_err().is_empty_message());
        assert_eq!(chat.transcript().len(), 2);
        assert!(chat.pending().is_some());
    }

    #[test]
    fn test_automatic_submit_then_generated_reply() {
        let mut chat = session(PersonaKind::Character);
        let outcome = chat.submit("오늘 시험 봤어").unwrap();

        assert!(matches!(outcome, SubmitOutcome::AwaitingGenerated { .. }));
        assert_eq!(outcome.message().role, MessageRole::User);
        assert!(chat.is_typing());

        chat.append_generated("오늘도 너무 수고했어! 정말 대단해! 🎉");
        assert!(!chat.is_typing());

        let roles: Vec<MessageRole> = chat.transcript().messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::Assistant, MessageRole::User, MessageRole::Assistant]
        );
    }

    #[test]
    fn test_manual_mode_impersonation() {
        let mut chat = session(PersonaKind::Professional);
        chat.set_mode(ResponseMode::Manual);

        let outcome = chat.submit("요즘 잠을 못 자요").unwrap();
        assert!(matches!(outcome, SubmitOutcome::AwaitingManual { .. }));
        assert_eq!(chat.pending().unwrap().content, "요즘 잠을 못 자요");
        assert!(chat.is_typing());

        let outcome = chat.submit(" 언제부터 그러셨나요? ").unwrap();
        let reply = outcome.message();
        assert!(matches!(outcome, SubmitOutcome::ManualReply { .. }));
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, " 언제부터 그러셨나요? ");
        assert!(chat.pending().is_none());
        assert!(!chat.is_typing());
    }

    #[test]
    fn test_leaving_manual_mode_drops_pending() {
        let mut chat = session(PersonaKind::Counselor);
        chat.set_mode(ResponseMode::Manual);
        chat.submit("hello").unwrap();
        assert_eq!(chat.toggle_mode(), ResponseMode::Automatic);
        assert!(chat.pending().is_none());
    }

    #[test]
    fn test_tarot_reading_is_appended_once() {
        let mut chat = session(PersonaKind::Tarot);
        let drawn = chat.draw_tarot(&mut ScriptedRandom::new(vec![4, 0, 0])).unwrap();
        let first = chat.spread().unwrap().deck().cards()[drawn[0]].clone();

        let before = chat.transcript().len();
        let content = chat.reveal_tarot().unwrap().content.clone();
        assert_eq!(chat.transcript().len(), before + 1);
        assert!(chat.reveal_tarot().is_err());
        assert_eq!(chat.transcript().len(), before + 1);

        let all: String = chat
            .transcript()
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        for part in [&first.name, &first.meaning, &first.interpretation] {
            assert!(content.contains(part.as_str()));
            assert_eq!(all.matches(part.as_str()).count(), 1);
        }
    }

    #[test]
    fn test_export_keeps_revealed_reading_on_one_line() {
        let mut chat = session(PersonaKind::Tarot);
        chat.submit("연애운이 궁금해요").unwrap();
        chat.draw_tarot(&mut ScriptedRandom::new(vec![0, 0, 0])).unwrap();
        chat.reveal_tarot().unwrap();

        let text = chat.export_text();
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), chat.transcript().len());
        assert!(lines[2].starts_with("타로 마스터: [과거] 🃏 The Fool 카드가 선택되었습니다. / "));
        assert!(lines[2].contains("[미래] 🃏 The High Priestess"));
        assert!(text.ends_with('\n') && !text.ends_with("\n\n"));
    }

    #[test]
    fn test_tarot_is_unavailable_to_other_personas() {
        let mut chat = session(PersonaKind::Character);
        assert!(chat.draw_tarot(&mut ScriptedRandom::new(vec![0])).unwrap_err().is_config());
        assert!(chat.reset_tarot().unwrap_err().is_config());
    }

    #[test]
    fn test_export_uses_persona_name() {
        let mut chat = session(PersonaKind::Character);
        chat.submit("안녕").unwrap();
        let text = chat.export_text();
        assert!(text.starts_with("귀여운 AI 친구: "));
        assert!(text.ends_with("사용자: 안녕\n"));
    }
}
