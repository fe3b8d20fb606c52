// Media processing seam
//
// - Commands: ffmpeg/ffprobe command builders
// - Processor: the ffmpeg-backed `MediaProcessor`

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Duration of an audio or video file in seconds
    async fn probe_duration(&self, media_path: &Path) -> Result<f64>;

    /// Render a solid-colour video of the given length
    async fn blank_video(&self, duration_secs: u64, canvas: &Canvas, output_path: &Path) -> Result<()>;

    /// Lay an audio track over a video
    async fn add_audio(&self, video_path: &Path, audio_path: &Path, output_path: &Path) -> Result<()>;

    /// Burn subtitles into a video, returning the written file
    async fn mux(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        options: &SubtitleOptions,
        output_path: &Path,
    ) -> Result<PathBuf>;

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessor> {
        Box::new(processor::FfmpegProcessor::new(config))
    }
}
