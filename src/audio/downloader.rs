//! Remote audio retrieval using yt-dlp.

use super::{diagnostics, run_tool};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Fetches the audio track of a remote video.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Download the audio of `link` into `target` (MP3).
    async fn fetch_audio(&self, link: &str, target: &Path) -> Result<()>;
}

/// yt-dlp based fetcher. Best available audio, transcoded to MP3.
pub struct YtDlpFetcher {
    yt_dlp: String,
    ffmpeg: String,
}

impl YtDlpFetcher {
    pub fn new(yt_dlp: impl Into<String>, ffmpeg: impl Into<String>) -> Self {
        Self {
            yt_dlp: yt_dlp.into(),
            ffmpeg: ffmpeg.into(),
        }
    }

    async fn download(&self, url: &Url, target: &Path) -> Result<()> {
        let (dir, stem) = split_target(target)?;
        let template = dir.join(format!("{}.%(ext)s", stem));

        let output = run_tool(
            &self.yt_dlp,
            &[
                OsStr::new("--extract-audio"),
                OsStr::new("--audio-format"),
                OsStr::new("mp3"),
                OsStr::new("--audio-quality"),
                OsStr::new("0"),
                OsStr::new("--output"),
                template.as_os_str(),
                OsStr::new("--no-playlist"),
                OsStr::new("--force-overwrites"),
                OsStr::new("--quiet"),
                OsStr::new("--no-warnings"),
                OsStr::new(url.as_str()),
            ],
            RecapError::FetchFailed,
        )
        .await?;

        if !output.status.success() {
            return Err(RecapError::FetchFailed(format!(
                "yt-dlp failed: {}",
                diagnostics(&output)
            )));
        }

        if has_content(target) {
            return Ok(());
        }

        // yt-dlp kept another container; normalize it into the target
        let downloaded = find_audio_file(dir, stem)?;
        let result = self.normalize_to_mp3(&downloaded, target).await;
        let _ = std::fs::remove_file(&downloaded);
        result
    }

    /// Converts an audio file to MP3 using ffmpeg.
    async fn normalize_to_mp3(&self, source: &Path, dest: &Path) -> Result<()> {
        debug!("Converting {:?} to MP3", source);

        let output = run_tool(
            &self.ffmpeg,
            &[
                OsStr::new("-i"),
                source.as_os_str(),
                OsStr::new("-vn"),
                OsStr::new("-codec:a"),
                OsStr::new("libmp3lame"),
                OsStr::new("-qscale:a"),
                OsStr::new("2"),
                OsStr::new("-y"),
                OsStr::new("-loglevel"),
                OsStr::new("error"),
                dest.as_os_str(),
            ],
            RecapError::FetchFailed,
        )
        .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RecapError::FetchFailed(format!(
                "ffmpeg conversion failed: {}",
                diagnostics(&output)
            )))
        }
    }
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new("yt-dlp", "ffmpeg")
    }
}

#[async_trait]
impl RemoteFetcher for YtDlpFetcher {
    #[instrument(skip(self, target), fields(link = %link))]
    async fn fetch_audio(&self, link: &str, target: &Path) -> Result<()> {
        let url = parse_link(link)?;
        info!("Downloading audio from {}", url);

        let result = self.download(&url, target).await;
        if result.is_err() {
            sweep_partials(target);
        }
        result
    }
}

/// Accept only absolute http(s) URLs.
fn parse_link(link: &str) -> Result<Url> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return Err(RecapError::FetchFailed("no link provided".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| RecapError::FetchFailed(format!("invalid link '{}': {}", trimmed, e)))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(RecapError::FetchFailed(format!(
            "invalid link '{}': only http(s) URLs are supported",
            trimmed
        ))),
    }
}

fn split_target(target: &Path) -> Result<(&Path, &str)> {
    let dir = target
        .parent()
        .ok_or_else(|| RecapError::FetchFailed(format!("target {:?} has no parent", target)))?;
    let stem = target
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| RecapError::FetchFailed(format!("target {:?} has no file stem", target)))?;
    Ok((dir, stem))
}

fn has_content(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Locates the file yt-dlp produced for this stem when it is not already MP3.
fn find_audio_file(dir: &Path, stem: &str) -> Result<PathBuf> {
    // Common audio formats that yt-dlp may produce
    for ext in &["opus", "m4a", "webm", "ogg"] {
        let candidate = dir.join(format!("{}.{}", stem, ext));
        if has_content(&candidate) {
            return Ok(candidate);
        }
    }

    Err(RecapError::FetchFailed(
        "audio file not found after download".to_string(),
    ))
}

/// Remove partial downloads (`.part`, `.ytdl`, intermediate containers) that
/// share the target's stem. The target itself belongs to its temp handle.
fn sweep_partials(target: &Path) {
    let Ok((dir, stem)) = split_target(target) else {
        return;
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path == target {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(stem) {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to remove partial download {:?}: {}", path, e);
            }
        }
    }
}
