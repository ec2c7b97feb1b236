//! Splitting long recordings into segments small enough for the transcription API.

use super::{diagnostics, run_tool};
use crate::error::{RecapError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Segments a long audio file into mono MP3 chunks of `chunk_seconds`.
///
/// Returns segment paths in playback order. Callers own `output_dir`.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn split_audio(
    ffmpeg: &str,
    ffprobe: &str,
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<PathBuf>> {
    let total_duration = probe_duration(ffprobe, source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = f64::from(chunk_seconds.max(1));
    let mut segments = Vec::new();
    let mut offset = 0.0;

    while offset < total_duration {
        let segment_path = output_dir.join(format!("segment_{:04}.mp3", segments.len()));
        let segment_len = chunk_len.min(total_duration - offset);

        extract_segment(ffmpeg, source, &segment_path, offset, segment_len).await?;
        debug!("Created segment at offset {:.1}s", offset);

        segments.push(segment_path);
        offset += chunk_len;
    }

    Ok(segments)
}

/// Re-encodes one time window of `source` as a compact mono MP3.
async fn extract_segment(
    ffmpeg: &str,
    source: &Path,
    dest: &Path,
    start: f64,
    length: f64,
) -> Result<()> {
    let start = format!("{:.3}", start);
    let length = format!("{:.3}", length);

    let output = run_tool(
        ffmpeg,
        &[
            OsStr::new("-ss"),
            OsStr::new(&start),
            OsStr::new("-i"),
            source.as_os_str(),
            OsStr::new("-t"),
            OsStr::new(&length),
            OsStr::new("-vn"),
            OsStr::new("-ac"),
            OsStr::new("1"),
            OsStr::new("-ar"),
            OsStr::new("16000"),
            OsStr::new("-codec:a"),
            OsStr::new("libmp3lame"),
            OsStr::new("-qscale:a"),
            OsStr::new("4"),
            OsStr::new("-y"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            dest.as_os_str(),
        ],
        RecapError::TranscriptionFailed,
    )
    .await?;

    if output.status.success() {
        Ok(())
    } else {
        Err(RecapError::TranscriptionFailed(format!(
            "segment extraction failed: {}",
            diagnostics(&output)
        )))
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
pub async fn probe_duration(ffprobe: &str, path: &Path) -> Result<f64> {
    let output = run_tool(
        ffprobe,
        &[
            OsStr::new("-v"),
            OsStr::new("quiet"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_format"),
            path.as_os_str(),
        ],
        RecapError::TranscriptionFailed,
    )
    .await?;

    if !output.status.success() {
        return Err(RecapError::TranscriptionFailed(format!(
            "ffprobe could not read {:?}",
            path.file_name().unwrap_or_default()
        )));
    }

    parse_duration(&output.stdout)
}

fn parse_duration(stdout: &[u8]) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|_| RecapError::TranscriptionFailed("invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| RecapError::TranscriptionFailed("could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = br#"{"format": {"filename": "a.mp3", "duration": "61.250000"}}"#;
        assert_eq!(parse_duration(json).unwrap(), 61.25);
    }

    #[test]
    fn test_parse_duration_missing() {
        assert!(parse_duration(br#"{"format": {}}"#).is_err());
        assert!(parse_duration(b"not json").is_err());
    }
}
