//! Audio track extraction from video containers.

use super::{diagnostics, run_tool};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, instrument};

/// Pulls the audio track out of a video file.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Write the audio of `video` to `target`. Single attempt, no retry.
    async fn extract_audio(&self, video: &Path, target: &Path) -> Result<()>;
}

/// ffmpeg-backed extractor producing MP3.
pub struct FfmpegExtractor {
    ffmpeg: String,
}

impl FfmpegExtractor {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    #[instrument(skip(self), fields(video = %video.display()))]
    async fn extract_audio(&self, video: &Path, target: &Path) -> Result<()> {
        debug!("Extracting audio to {:?}", target);

        // -y: the target is a pre-created scratch file
        let output = run_tool(
            &self.ffmpeg,
            &[
                OsStr::new("-i"),
                video.as_os_str(),
                OsStr::new("-vn"),
                OsStr::new("-codec:a"),
                OsStr::new("libmp3lame"),
                OsStr::new("-qscale:a"),
                OsStr::new("2"),
                OsStr::new("-y"),
                OsStr::new("-loglevel"),
                OsStr::new("error"),
                target.as_os_str(),
            ],
            RecapError::ExtractionFailed,
        )
        .await?;

        if !output.status.success() {
            return Err(RecapError::ExtractionFailed(diagnostics(&output)));
        }

        Ok(())
    }
}
