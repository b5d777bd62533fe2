pub mod chat;
pub mod config;
pub mod error;
pub mod message;
pub mod persona;
pub mod random;
pub mod relay;
pub mod route;
pub mod tarot;
pub mod transcript;

// Re-export common error type
pub use error::{FakebotError, Result};
pub use message::{Message, MessageId, MessageRole};
pub use transcript::{Transcript, TranscriptLabels};
