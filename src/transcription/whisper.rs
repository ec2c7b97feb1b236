//! OpenAI Whisper transcription implementation.

use super::Transcriber;
use crate::audio::{probe_duration, split_audio};
use crate::config::{ToolSettings, TranscriptionSettings};
use crate::error::{RecapError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Upload limit of the transcription endpoint, with some headroom.
const MAX_UPLOAD_BYTES: u64 = 24 * 1024 * 1024;

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    language: Option<String>,
    chunk_duration_seconds: u32,
    max_concurrent_chunks: usize,
    ffmpeg: String,
    ffprobe: String,
}

impl WhisperTranscriber {
    /// Create a transcriber from settings. Call once per process.
    pub fn from_settings(settings: &TranscriptionSettings, tools: &ToolSettings) -> Result<Self> {
        let client = create_client(Duration::from_secs(settings.api_timeout_seconds))?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            language: settings.language.clone().filter(|l| !l.is_empty()),
            chunk_duration_seconds: settings.chunk_duration_seconds,
            max_concurrent_chunks: settings.max_concurrent_chunks.max(1),
            ffmpeg: tools.ffmpeg.clone(),
            ffprobe: tools.ffprobe.clone(),
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<String> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|e| unreadable(audio_path, e))?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder.build().map_err(|e| {
            RecapError::TranscriptionFailed(format!("Failed to build request: {}", e))
        })?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| RecapError::TranscriptionFailed(format!("Whisper API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }

    /// Whether the file must be split before upload.
    async fn needs_splitting(&self, audio_path: &Path) -> Result<bool> {
        let size = tokio::fs::metadata(audio_path)
            .await
            .map_err(|e| unreadable(audio_path, e))?
            .len();
        if size > MAX_UPLOAD_BYTES {
            return Ok(true);
        }
        let duration = probe_duration(&self.ffprobe, audio_path).await?;
        Ok(duration > f64::from(self.chunk_duration_seconds))
    }

    /// Split into segments next to the source file and transcribe them in order.
    async fn transcribe_with_splitting(&self, audio_path: &Path) -> Result<String> {
        let scratch = audio_path.parent().unwrap_or_else(|| Path::new("."));
        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");

        // Removed on drop, including on error
        let segment_dir = tempfile::Builder::new()
            .prefix(&format!("{}-segments", stem))
            .tempdir_in(scratch)
            .map_err(|e| {
                RecapError::TranscriptionFailed(format!("Failed to create segment dir: {}", e))
            })?;

        let segments = split_audio(
            &self.ffmpeg,
            &self.ffprobe,
            audio_path,
            segment_dir.path(),
            self.chunk_duration_seconds,
        )
        .await?;

        info!("Processing {} audio segments with {}", segments.len(), self.model);

        let requests: Vec<_> = segments
            .iter()
            .map(|segment| self.transcribe_single(segment))
            .collect();
        let texts: Vec<String> = stream::iter(requests)
            .buffered(self.max_concurrent_chunks)
            .try_collect()
            .await?;

        Ok(join_segments(texts))
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        if self.needs_splitting(audio_path).await? {
            self.transcribe_with_splitting(audio_path).await
        } else {
            self.transcribe_single(audio_path).await
        }
    }
}

/// Create an OpenAI client with a request timeout.
fn create_client(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RecapError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

fn unreadable(path: &Path, e: std::io::Error) -> RecapError {
    RecapError::TranscriptionFailed(format!("Cannot read audio {}: {}", path.display(), e))
}

fn join_segments(texts: Vec<String>) -> String {
    texts
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_segments_skips_silence() {
        let joined = join_segments(vec![
            "First part.".to_string(),
            String::new(),
            "Second part.".to_string(),
        ]);
        assert_eq!(joined, "First part. Second part.");
    }

    #[tokio::test]
    async fn test_unreadable_audio_is_transcription_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transcriber = WhisperTranscriber::from_settings(
            &TranscriptionSettings::default(),
            &ToolSettings::default(),
        )
        .unwrap();

        let err = transcriber
            .transcribe(&dir.path().join("missing.mp3"))
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::TranscriptionFailed(ref m) if m.contains("missing.mp3")));
    }

    #[test]
    fn test_from_settings() {
        let settings = TranscriptionSettings {
            language: Some(String::new()),
            max_concurrent_chunks: 0,
            ..Default::default()
        };
        let transcriber =
            WhisperTranscriber::from_settings(&settings, &ToolSettings::default()).unwrap();

        assert!(transcriber.language.is_none());
        assert_eq!(transcriber.max_concurrent_chunks, 1);
        assert_eq!(transcriber.model, "whisper-1");
    }
}
