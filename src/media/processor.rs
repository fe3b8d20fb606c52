use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::MediaConfig;
use crate::error::{BoardsubError, Result};
use super::{Canvas, MediaCommandBuilder, MediaProcessor, SubtitleOptions};

/// Parse the duration printed by ffprobe
pub fn parse_duration(stdout: &str) -> Result<f64> {
    let value = stdout.trim();
    let duration: f64 = value
        .parse()
        .map_err(|_| BoardsubError::Media(format!("Unexpected duration output: '{}'", value)))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(BoardsubError::Media(format!("Invalid duration: {}", duration)));
    }

    Ok(duration)
}

/// Concrete implementation of media processor (FFmpeg-based)
pub struct FfmpegProcessor {
    command_builder: MediaCommandBuilder,
}

impl FfmpegProcessor {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, &config.probe_binary_path);

        Self { command_builder }
    }
}

#[async_trait]
impl MediaProcessor for FfmpegProcessor {
    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        if !media_path.exists() {
            return Err(BoardsubError::FileNotFound(media_path.display().to_string()));
        }

        let stdout = self.command_builder.probe_duration(media_path).execute().await?;
        let duration = parse_duration(&stdout)?;
        info!("Duration of {}: {:.3}s", media_path.display(), duration);
        Ok(duration)
    }

    async fn blank_video(&self, duration_secs: u64, canvas: &Canvas, output_path: &Path) -> Result<()> {
        info!(
            "Generating {}s blank video {}x{}@{} -> {}",
            duration_secs, canvas.width, canvas.height, canvas.fps, output_path.display()
        );

        self.command_builder
            .blank_video(duration_secs, canvas, output_path)
            .execute()
            .await?;

        info!("Blank video generated");
        Ok(())
    }

    async fn add_audio(&self, video_path: &Path, audio_path: &Path, output_path: &Path) -> Result<()> {
        info!(
            "Adding audio {} to {} -> {}",
            audio_path.display(), video_path.display(), output_path.display()
        );

        self.command_builder
            .add_audio(video_path, audio_path, output_path)
            .execute()
            .await?;

        info!("Audio added to video");
        Ok(())
    }

    async fn mux(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        options: &SubtitleOptions,
        output_path: &Path,
    ) -> Result<PathBuf> {
        info!(
            "Embedding subtitles from {} into {} -> {}",
            subtitle_path.display(),
            video_path.display(),
            output_path.display()
        );

        // The command runs from the subtitle directory; pin the other paths
        let video_path = std::path::absolute(video_path)?;
        let output_path = std::path::absolute(output_path)?;

        self.command_builder
            .burn_subtitles(video_path.as_path(), subtitle_path, output_path.as_path(), options)
            .execute()
            .await?;

        info!("Subtitle embedding completed successfully");
        Ok(output_path)
    }

    async fn check_availability(&self) -> Result<()> {
        let version = self.command_builder.version_check().execute().await
            .map_err(|e| BoardsubError::Media(format!("ffmpeg not available: {}", e)))?;
        info!("Media processor is available: {}", version.lines().next().unwrap_or("unknown version"));

        self.command_builder.probe_version_check().execute().await
            .map_err(|e| BoardsubError::Media(format!("ffprobe not available: {}", e)))?;
        info!("Duration probe is available");

        Ok(())
    }
}
