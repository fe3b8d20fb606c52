// Speech-to-text seam
//
// The workflow only needs three things from a speech engine: the full text,
// the detected language and timed segments. Implementations turn whatever
// their engine emits into `Transcription`.

pub mod whisper_cli;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

pub use whisper_cli::WhisperCliTranscriber;
use crate::config::TranscriberConfig;
use crate::error::Result;

/// What the engine should do with the audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Text in the spoken language
    Transcribe,
    /// Text translated to English
    Translate,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Transcribe => write!(f, "transcribe"),
            Task::Translate => write!(f, "translate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<TranscriptionSegment>,
    pub language: Option<String>,
}

/// Main trait for transcription operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Run the engine over an audio file
    async fn transcribe(&self, audio_path: &Path, task: Task) -> Result<Transcription>;

    /// Check that the engine can be invoked
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create the default transcriber (whisper command-line tool)
    pub fn create_default(config: TranscriberConfig) -> Box<dyn Transcriber> {
        Box::new(WhisperCliTranscriber::new(config))
    }
}
