// OpenAI Whisper command-line implementation

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{BoardsubError, Result};
use super::{Task, Transcriber, Transcription, TranscriptionSegment};

/// JSON document written by `whisper --output_format json`
#[derive(Debug, Clone, Deserialize)]
struct WhisperOutput {
    text: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

impl From<WhisperOutput> for Transcription {
    fn from(output: WhisperOutput) -> Self {
        let segments = output
            .segments
            .into_iter()
            .map(|seg| TranscriptionSegment {
                start: seg.start,
                end: seg.end,
                text: seg.text.trim().to_string(),
            })
            .collect();

        Transcription {
            text: output.text,
            segments,
            language: output.language,
        }
    }
}

/// Parse whisper's JSON output into a transcription
pub fn parse_whisper_json(content: &str) -> Result<Transcription> {
    let output: WhisperOutput = serde_json::from_str(content)?;
    Ok(output.into())
}

pub struct WhisperCliTranscriber {
    config: TranscriberConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Arguments for one whisper run, excluding the binary itself
    pub fn build_args(&self, audio_path: &Path, output_dir: &Path, task: Task) -> Vec<String> {
        let mut args = vec![
            audio_path.to_string_lossy().to_string(),
            "--model".to_string(),
            self.config.model.clone(),
            "--device".to_string(),
            self.config.device.clone(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--task".to_string(),
            task.to_string(),
        ];

        if task == Task::Translate {
            args.extend([
                "--beam_size".to_string(),
                self.config.beam_size.to_string(),
                "--best_of".to_string(),
                self.config.best_of.to_string(),
            ]);
        }

        if let Some(lang) = &self.config.language {
            args.push("--language".to_string());
            args.push(lang.clone());
        }

        args
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path, task: Task) -> Result<Transcription> {
        info!("Running whisper ({}) on {}", task, audio_path.display());

        if !audio_path.exists() {
            return Err(BoardsubError::FileNotFound(audio_path.display().to_string()));
        }

        // Whisper writes its results into a directory, not stdout
        let temp_dir = tempfile::tempdir()
            .map_err(|e| BoardsubError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let args = self.build_args(audio_path, output_dir, task);
        debug!("Executing whisper command: {} {:?}", self.config.binary_path, args);

        let output = Command::new(&self.config.binary_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| BoardsubError::Transcriber(format!("Failed to execute whisper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BoardsubError::Transcriber(format!("Whisper failed: {}", stderr)));
        }

        let audio_stem = audio_path
            .file_stem()
            .ok_or_else(|| BoardsubError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));

        if !json_file.exists() {
            return Err(BoardsubError::Transcriber(
                "Whisper JSON output file not found".to_string(),
            ));
        }

        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| BoardsubError::Transcriber(format!("Failed to read JSON output: {}", e)))?;

        let transcription = parse_whisper_json(&json_content)?;
        info!(
            "Whisper ({}) produced {} segments",
            task,
            transcription.segments.len()
        );
        Ok(transcription)
    }

    async fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("--help")
            .output()
            .await
            .map_err(|e| BoardsubError::Transcriber(format!("whisper command not found: {}", e)))?;

        if output.status.success() {
            info!("Whisper command-line tool is available");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(BoardsubError::Transcriber(format!(
                "Whisper not available. Install with: pip install openai-whisper\nError: {}",
                stderr
            )))
        }
    }
}
