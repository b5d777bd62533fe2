//! Writes transcripts to downloadable text files.

use std::path::{Path, PathBuf};

use chrono::Utc;
use fakebot_core::persona::PersonaKind;
use fakebot_core::relay::SessionId;
use fakebot_core::{Result, Transcript, TranscriptLabels};

/// What the exported conversation was, used in the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTag<'a> {
    /// A single-operator chat with a persona.
    Persona(PersonaKind),
    /// A relayed counseling session.
    Counseling(&'a SessionId),
}

impl ExportTag<'_> {
    fn file_name(&self, millis: i64) -> String {
        match self {
            ExportTag::Persona(kind) => format!("AI_Chat_{}_{}.txt", kind.tag(), millis),
            ExportTag::Counseling(session) => format!("심리상담_기록_{}_{}.txt", session, millis),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptExporter {
    dir: PathBuf,
}

impl TranscriptExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Renders `transcript` with `labels` and writes it, returning the path.
    pub async fn export(
        &self,
        tag: ExportTag<'_>,
        transcript: &Transcript,
        labels: &TranscriptLabels,
    ) -> Result<PathBuf> {
        self.write(tag, &transcript.export_text(labels)).await
    }

    /// Writes already rendered transcript text.
    pub async fn write(&self, tag: ExportTag<'_>, text: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(tag.file_name(Utc::now().timestamp_millis()));
        tokio::fs::write(&path, text).await?;

        tracing::info!("[TranscriptExporter] Wrote {}", path.display());
        Ok(path)
    }
}
