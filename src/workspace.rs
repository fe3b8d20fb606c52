use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{BoardsubError, Result};

const ATTACHMENTS_DIR: &str = "attachments";
const OUTPUTS_DIR: &str = "outputs";
const VIDEOS_DIR: &str = "videos";
const LOG_DIR: &str = "log";
const SUBTITLE_FILE: &str = "Subtitle.srt";
const TRANSCRIPT_FILE: &str = "Transcribed.txt";
const TRANSLATION_FILE: &str = "Translated.txt";
const BLANK_VIDEO_FILE: &str = "Blank.mp4";
const VIDEO_WITH_AUDIO_FILE: &str = "Video_with_audio.mp4";
const FALLBACK_VIDEO_STEM: &str = "Video_with_subtitle";

/// Final video name for an audio file: everything before the first dot,
/// with Trello's `%2B` escape turned back into `+`.
pub fn final_video_name(audio_file_name: &str) -> String {
    let stem = audio_file_name.split('.').next().unwrap_or_default().replace("%2B", "+");
    if stem.is_empty() {
        format!("{}.mp4", FALLBACK_VIDEO_STEM)
    } else {
        format!("{}.mp4", stem)
    }
}

/// On-disk layout the pipeline works in.
///
/// `attachments/` is a staging area holding at most one downloaded file;
/// `outputs/` holds what gets uploaded back to the card; `videos/` holds
/// intermediate renders.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.root.join(ATTACHMENTS_DIR)
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.root.join(OUTPUTS_DIR)
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join(VIDEOS_DIR)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOG_DIR)
    }

    pub fn subtitle_path(&self) -> PathBuf {
        self.root.join(SUBTITLE_FILE)
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.outputs_dir().join(TRANSCRIPT_FILE)
    }

    pub fn translation_path(&self) -> PathBuf {
        self.outputs_dir().join(TRANSLATION_FILE)
    }

    pub fn blank_video_path(&self) -> PathBuf {
        self.videos_dir().join(BLANK_VIDEO_FILE)
    }

    pub fn video_with_audio_path(&self) -> PathBuf {
        self.videos_dir().join(VIDEO_WITH_AUDIO_FILE)
    }

    /// Where the subtitled video for `audio_path` is written
    pub fn final_video_path(&self, audio_path: &Path) -> PathBuf {
        let name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        self.outputs_dir().join(final_video_name(&name))
    }

    /// Create every directory the pipeline writes into
    pub async fn prepare(&self) -> Result<()> {
        for dir in [self.attachments_dir(), self.outputs_dir(), self.videos_dir(), self.log_dir()] {
            fs::create_dir_all(&dir).await?;
        }
        debug!("Workspace ready at {}", self.root.display());
        Ok(())
    }

    /// Remove everything in the staging area, returning how many entries went
    pub async fn clear_attachments(&self) -> Result<u64> {
        let dir = self.attachments_dir();
        if !dir.exists() {
            return Ok(0);
        }

        let entries = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| BoardsubError::Io(e.into()))?;

        let mut removed = 0;
        for entry in entries {
            if entry.file_type().is_dir() {
                fs::remove_dir_all(entry.path()).await?;
            } else {
                fs::remove_file(entry.path()).await?;
            }
            removed += 1;
        }

        if removed > 0 {
            debug!("Cleared {} staged attachment(s)", removed);
        }
        Ok(removed)
    }

    /// Replace whatever is staged with a freshly downloaded attachment
    pub async fn stage_attachment(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        // Only the final component, so a crafted name cannot escape the staging area
        let safe_name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| BoardsubError::Board(format!("Unusable attachment file name '{}'", file_name)))?;

        self.clear_attachments().await?;
        fs::create_dir_all(self.attachments_dir()).await?;

        let path = self.attachments_dir().join(safe_name);
        fs::write(&path, contents).await?;

        info!("Saving {} done", path.display());
        Ok(path)
    }
}
