use serde::{Deserialize, Serialize};

/// How "AI" replies are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Canned replies are generated after a short delay.
    #[default]
    Automatic,
    /// The operator types the reply, which is shown as the AI's.
    Manual,
}

impl ResponseMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Automatic => Self::Manual,
            Self::Manual => Self::Automatic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Automatic => "자동 응답",
            Self::Manual => "수동 응답",
        }
    }
}
