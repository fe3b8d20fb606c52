use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::error::{BoardsubError, Result};

/// Blank canvas the subtitles are drawn on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub color: String,
}

/// Encoding options for subtitle burn-in
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtitleOptions {
    pub video_codec: String,
    /// ASS force_style, e.g. `MarginV=50,Fontsize=20`; empty means none
    pub force_style: String,
    pub extra_args: Vec<String>,
}

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    pub current_dir: Option<PathBuf>,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            current_dir: None,
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Run the command from another directory
    pub fn in_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Select a stream from an input
    pub fn map<S: Into<String>>(self, spec: S) -> Self {
        self.arg("-map").arg(spec)
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Execute the command, returning its stdout
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await
            .map_err(|e| BoardsubError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BoardsubError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builder for the ffmpeg/ffprobe invocations the pipeline needs
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_binary_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_binary_path: probe_binary_path.into(),
        }
    }

    /// Build duration probe command; prints the duration in seconds
    pub fn probe_duration<P: AsRef<Path>>(&self, media_path: P) -> MediaCommand {
        MediaCommand::new(&self.probe_binary_path, "Duration probe")
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .output(media_path)
    }

    /// Build blank video generation command
    pub fn blank_video<P: AsRef<Path>>(
        &self,
        duration_secs: u64,
        canvas: &Canvas,
        output_path: P,
    ) -> MediaCommand {
        let source = format!(
            "color=c={}:s={}x{}:r={}:d={}",
            canvas.color, canvas.width, canvas.height, canvas.fps, duration_secs
        );

        MediaCommand::new(&self.binary_path, "Blank video generation")
            .overwrite()
            .args(["-f", "lavfi"])
            .input(source)
            .video_codec("libx264")
            .args(["-pix_fmt", "yuv420p"])
            .output(output_path)
    }

    /// Build command laying an audio track over a video
    pub fn add_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
        output_path: P,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio muxing")
            .overwrite()
            .input(video_path)
            .input(audio_path)
            .map("0:v:0")
            .map("1:a:0")
            .copy_video()
            .audio_codec("aac")
            .output(output_path)
    }

    /// Build subtitle burn-in command.
    ///
    /// The `subtitles` filter parses its argument, so the subtitle file is
    /// referenced by name and the command runs inside its directory.
    pub fn burn_subtitles<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_path: P,
        output_path: P,
        options: &SubtitleOptions,
    ) -> MediaCommand {
        let subtitle_path = subtitle_path.as_ref();
        let subtitle_name = subtitle_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let filter = if options.force_style.is_empty() {
            format!("subtitles={}", subtitle_name)
        } else {
            format!("subtitles={}:force_style='{}'", subtitle_name, options.force_style)
        };

        let mut cmd = MediaCommand::new(&self.binary_path, "Subtitle embedding")
            .overwrite()
            .input(video_path)
            .video_filter(filter)
            .video_codec(options.video_codec.clone())
            .copy_audio();

        // Add user-specified additional options
        for option in &options.extra_args {
            cmd = cmd.arg(option);
        }

        if let Some(dir) = subtitle_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            cmd = cmd.in_dir(dir);
        }

        cmd.output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }

    /// Build probe version check command
    pub fn probe_version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.probe_binary_path, "Probe version check")
            .arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MediaCommandBuilder {
        MediaCommandBuilder::new("ffmpeg", "ffprobe")
    }

    #[test]
    fn test_blank_video_command() {
        let canvas = Canvas {
            width: 1400,
            height: 800,
            fps: 15,
            color: "white".to_string(),
        };
        let cmd = builder().blank_video(13, &canvas, "videos/Blank.mp4");

        assert_eq!(cmd.binary_path, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec![
                "-y", "-f", "lavfi", "-i", "color=c=white:s=1400x800:r=15:d=13",
                "-c:v", "libx264", "-pix_fmt", "yuv420p", "videos/Blank.mp4",
            ]
        );
    }

    #[test]
    fn test_add_audio_command() {
        let cmd = builder().add_audio("v.mp4", "a.mp3", "out.mp4");
        assert_eq!(
            cmd.args,
            vec![
                "-y", "-i", "v.mp4", "-i", "a.mp3", "-map", "0:v:0", "-map", "1:a:0",
                "-c:v", "copy", "-c:a", "aac", "out.mp4",
            ]
        );
    }

    #[test]
    fn test_burn_subtitles_runs_in_subtitle_dir() {
        let options = SubtitleOptions {
            video_codec: "h264_amf".to_string(),
            force_style: "MarginV=50,Fontsize=20".to_string(),
            extra_args: vec!["-preset".to_string(), "fast".to_string()],
        };
        let cmd = builder().burn_subtitles(
            Path::new("/work/videos/Video_with_audio.mp4"),
            Path::new("/work/Subtitle.srt"),
            Path::new("/work/outputs/talk.mp4"),
            &options,
        );

        assert_eq!(cmd.current_dir, Some(PathBuf::from("/work")));
        assert_eq!(
            cmd.args,
            vec![
                "-y", "-i", "/work/videos/Video_with_audio.mp4",
                "-vf", "subtitles=Subtitle.srt:force_style='MarginV=50,Fontsize=20'",
                "-c:v", "h264_amf", "-c:a", "copy", "-preset", "fast",
                "/work/outputs/talk.mp4",
            ]
        );
    }

    #[test]
    fn test_burn_subtitles_without_style() {
        let options = SubtitleOptions {
            video_codec: "libx264".to_string(),
            ..SubtitleOptions::default()
        };
        let cmd = builder().burn_subtitles("in.mp4", "Subtitle.srt", "out.mp4", &options);
        assert!(cmd.args.contains(&"subtitles=Subtitle.srt".to_string()));
        assert_eq!(cmd.current_dir, None);
    }

    #[test]
    fn test_probe_duration_command() {
        let cmd = builder().probe_duration("a.wav");
        assert_eq!(cmd.binary_path, "ffprobe");
        assert_eq!(cmd.args.last().map(String::as_str), Some("a.wav"));
    }

    #[tokio::test]
    async fn test_execute_missing_binary() {
        let cmd = MediaCommand::new("/nonexistent/ffmpeg-binary", "Nothing");
        assert!(matches!(cmd.execute().await, Err(BoardsubError::Media(_))));
    }
}
