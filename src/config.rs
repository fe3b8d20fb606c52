use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{BoardsubError, Result};

fn default_base_url() -> String {
    "https://api.trello.com/1".to_string()
}

fn default_interval_secs() -> u64 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub trello: TrelloConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub transcriber: TranscriberConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrelloConfig {
    /// Board whose lists are watched
    pub board_id: String,
    /// API key sent with every request
    pub api_key: String,
    /// API token sent with every request
    pub api_token: String,
    /// REST API root, overridable for testing against a local server
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds to sleep between poll cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding attachments/, outputs/, videos/ and log/
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Path to the whisper CLI
    pub binary_path: String,
    /// Whisper model name (tiny, base, small, medium, large)
    pub model: String,
    /// Device passed to whisper (cpu, cuda)
    pub device: String,
    /// Source language hint; auto-detected when absent
    pub language: Option<String>,
    /// Beam size used for the translation pass
    pub beam_size: u32,
    /// Candidates sampled for the translation pass
    pub best_of: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary, used to read audio duration
    pub probe_binary_path: String,
    /// Blank canvas width in pixels
    pub width: u32,
    /// Blank canvas height in pixels
    pub height: u32,
    /// Frame rate of the generated video
    pub fps: u32,
    /// Canvas colour, any ffmpeg colour name or hex value
    pub color: String,
    /// Seconds appended to the audio duration for the blank video
    pub padding_secs: u64,
    /// Encoder for the final video (libx264, h264_nvenc, h264_amf, ...)
    pub video_codec: String,
    /// ASS force_style applied to burned-in subtitles
    pub subtitle_style: String,
    /// Additional encoding options for subtitle embedding
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub subtitle_options: Vec<String>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary_path: "whisper".to_string(),
            model: "small".to_string(),
            device: "cpu".to_string(),
            language: None,
            beam_size: 5,
            best_of: 5,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_binary_path: "ffprobe".to_string(),
            width: 1400,
            height: 800,
            fps: 15,
            color: "white".to_string(),
            padding_secs: 3,
            video_codec: "libx264".to_string(),
            subtitle_style: "MarginV=50,Fontsize=20".to_string(),
            subtitle_options: vec![],
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BoardsubError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| BoardsubError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject credentials that parse but cannot possibly authenticate
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("trello.board_id", &self.trello.board_id),
            ("trello.api_key", &self.trello.api_key),
            ("trello.api_token", &self.trello.api_token),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(BoardsubError::Config(format!("{} must not be empty", name)));
            }
        }

        if self.media.fps == 0 || self.media.width == 0 || self.media.height == 0 {
            return Err(BoardsubError::Config(
                "media.width, media.height and media.fps must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
