//! Audio extraction and retrieval.
//!
//! This module wraps the external tools the pipeline shells out to: ffmpeg for
//! demuxing video containers and splitting long recordings, ffprobe for
//! durations, and yt-dlp for remote videos.

mod downloader;
mod extract;
mod split;

pub use downloader::{RemoteFetcher, YtDlpFetcher};
pub use extract::{AudioExtractor, FfmpegExtractor};
pub use split::{probe_duration, split_audio};

use crate::error::{RecapError, Result};
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Run an external tool to completion and capture its stderr.
///
/// Spawn failures, a missing binary included, are reported through `on_error`
/// so callers keep their stage's error kind. The child is killed if the future
/// is dropped (e.g. when the caller's timeout fires).
pub(crate) async fn run_tool(
    program: &str,
    args: &[&std::ffi::OsStr],
    on_error: fn(String) -> RecapError,
) -> Result<Output> {
    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;

    match result {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(on_error(format!(
            "{} not found. Please install it and ensure it's in your PATH.",
            program
        ))),
        Err(e) => Err(on_error(format!("{} execution failed: {}", program, e))),
    }
}

/// Last non-empty stderr lines of a failed tool run.
pub(crate) fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("exited with {}", output.status)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let err = run_tool(
            "recap-definitely-not-installed",
            &[OsStr::new("--version")],
            RecapError::ExtractionFailed,
        )
        .await
        .unwrap_err();

        match err {
            RecapError::ExtractionFailed(message) => {
                assert!(message.contains("recap-definitely-not-installed not found"));
                assert!(message.contains("install it"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
