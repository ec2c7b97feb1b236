//! Speech-to-text for the transcription pipeline.
//!
//! The process builds one [`Transcriber`] at startup and shares it read-only
//! (`Arc<dyn Transcriber>`) across every request. Implementations must be
//! safe for concurrent calls; the Whisper client is, since each call is an
//! independent HTTP request.

mod whisper;

pub use whisper::{is_api_key_configured, WhisperTranscriber};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into plain text. No partial results on failure.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
