//! Error types for fakebot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tarot::TarotError;

/// A shared error type for the entire fakebot workspace.
///
/// Variants are structured so callers can branch on the failure class
/// instead of matching message strings.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FakebotError {
    /// Outgoing text was empty or whitespace only.
    #[error("Message is empty")]
    EmptyMessage,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error (unknown persona, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session identifier or route could not be used
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// Relay store failure
    #[error("Relay error: {0}")]
    Relay(String),

    /// Tarot spread misuse
    #[error(transparent)]
    Tarot(#[from] TarotError),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FakebotError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidSession error
    pub fn invalid_session(message: impl Into<String>) -> Self {
        Self::InvalidSession(message.into())
    }

    /// Creates a Relay error
    pub fn relay(message: impl Into<String>) -> Self {
        Self::Relay(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an EmptyMessage rejection
    pub fn is_empty_message(&self) -> bool {
        matches!(self, Self::EmptyMessage)
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FakebotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FakebotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FakebotError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FakebotError>`.
pub type Result<T> = std::result::Result<T, FakebotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let err: FakebotError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "relay dir missing").into();
        match err {
            FakebotError::Io { message } => {
                assert!(message.contains("relay dir missing"));
                assert!(message.contains("NotFound"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_json_error_is_serialization() {
        let err: FakebotError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn test_toml_error_is_serialization() {
        let err: FakebotError = toml::from_str::<toml::Value>("key = ").unwrap_err().into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: TOML"));
    }

    #[test]
    fn test_tarot_error_is_transparent() {
        let err: FakebotError = TarotError::NoDraw.into();
        assert_eq!(err.to_string(), TarotError::NoDraw.to_string());
    }
}
