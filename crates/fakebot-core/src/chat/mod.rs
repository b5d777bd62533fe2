//! Single-operator persona chat.
//!
//! - `mode`: Automatic vs. manual reply mode
//! - `session`: The chat state machine (`ChatSession`)

mod mode;
mod session;

pub use mode::ResponseMode;
pub use session::{ChatSession, SubmitOutcome};
