use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::media::{Canvas, MediaProcessor, SubtitleOptions};
use crate::subtitle::generate_srt;
use crate::transcribe::{Task, Transcriber};
use crate::workspace::Workspace;

/// Files produced for one audio attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutputs {
    pub transcript: PathBuf,
    pub translation: PathBuf,
    pub video: PathBuf,
}

impl GeneratedOutputs {
    /// Files to attach to the card, in upload order
    pub fn files(&self) -> Vec<PathBuf> {
        vec![self.transcript.clone(), self.translation.clone(), self.video.clone()]
    }
}

/// Turns a staged audio file into transcript, translation and a subtitled video
pub struct OutputGenerator {
    transcriber: Box<dyn Transcriber>,
    media: Box<dyn MediaProcessor>,
    canvas: Canvas,
    subtitle_options: SubtitleOptions,
    padding_secs: u64,
}

impl OutputGenerator {
    pub fn new(
        transcriber: Box<dyn Transcriber>,
        media: Box<dyn MediaProcessor>,
        config: &MediaConfig,
    ) -> Self {
        Self {
            transcriber,
            media,
            canvas: Canvas {
                width: config.width,
                height: config.height,
                fps: config.fps,
                color: config.color.clone(),
            },
            subtitle_options: SubtitleOptions {
                video_codec: config.video_codec.clone(),
                force_style: config.subtitle_style.clone(),
                extra_args: config.subtitle_options.clone(),
            },
            padding_secs: config.padding_secs,
        }
    }

    pub fn transcriber(&self) -> &dyn Transcriber {
        self.transcriber.as_ref()
    }

    pub fn media(&self) -> &dyn MediaProcessor {
        self.media.as_ref()
    }

    pub async fn generate(&self, audio_path: &Path, workspace: &Workspace) -> Result<GeneratedOutputs> {
        info!("Generating outputs for {}", audio_path.display());
        fs::create_dir_all(workspace.outputs_dir()).await?;
        fs::create_dir_all(workspace.videos_dir()).await?;

        let transcript = self.write_transcript(audio_path, workspace).await?;
        let translation = self.write_translation(audio_path, workspace).await?;
        let video = self.render_video(audio_path, workspace).await?;

        Ok(GeneratedOutputs {
            transcript,
            translation,
            video,
        })
    }

    async fn write_transcript(&self, audio_path: &Path, workspace: &Workspace) -> Result<PathBuf> {
        info!("Generating transcribe");
        let transcription = self.transcriber.transcribe(audio_path, Task::Transcribe).await?;

        let path = workspace.transcript_path();
        fs::write(&path, &transcription.text).await?;
        info!("Saved transcribe to {}", path.display());
        Ok(path)
    }

    async fn write_translation(&self, audio_path: &Path, workspace: &Workspace) -> Result<PathBuf> {
        info!("Generating translation");
        let translation = self.transcriber.transcribe(audio_path, Task::Translate).await?;

        let path = workspace.translation_path();
        fs::write(&path, &translation.text).await?;
        info!("Saved translation to {}", path.display());

        generate_srt(&translation, workspace.subtitle_path()).await?;
        Ok(path)
    }

    async fn render_video(&self, audio_path: &Path, workspace: &Workspace) -> Result<PathBuf> {
        let duration = self.media.probe_duration(audio_path).await?;
        let duration_secs = duration.trunc() as u64 + self.padding_secs;

        let blank = workspace.blank_video_path();
        self.media.blank_video(duration_secs, &self.canvas, &blank).await?;

        let with_audio = workspace.video_with_audio_path();
        self.media.add_audio(&blank, audio_path, &with_audio).await?;

        let final_video = workspace.final_video_path(audio_path);
        let written = self
            .media
            .mux(&with_audio, &workspace.subtitle_path(), &self.subtitle_options, &final_video)
            .await?;

        info!("Final video generated at {}", written.display());
        Ok(written)
    }
}
