//! Error types for Recap.

use std::fmt;
use thiserror::Error;

/// Pipeline stage an adapter call belongs to, used to label timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    Transcription,
    Document,
    Fetch,
    Summarization,
    Keywords,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extraction => "audio extraction",
            Stage::Transcription => "transcription",
            Stage::Document => "document parsing",
            Stage::Fetch => "remote fetch",
            Stage::Summarization => "summarization",
            Stage::Keywords => "keyword extraction",
        };
        f.write_str(name)
    }
}

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Document parsing failed: {0}")]
    DocumentParseFailed(String),

    #[error("Remote fetch failed: {0}")]
    FetchFailed(String),

    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),

    #[error("Keyword extraction failed: {0}")]
    KeywordExtractionFailed(String),

    #[error("{stage} timed out after {seconds}s")]
    Timeout { stage: Stage, seconds: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecapError {
    /// Whether the caller is at fault (bad format or parameters) rather than the pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecapError::UnsupportedFormat(_) | RecapError::InvalidInput(_)
        )
    }
}

impl From<tokio::task::JoinError> for RecapError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            RecapError::Internal("worker task panicked".to_string())
        } else {
            RecapError::Internal(format!("worker task failed: {}", err))
        }
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(RecapError::UnsupportedFormat("xyz".into()).is_client_error());
        assert!(RecapError::InvalidInput("count".into()).is_client_error());
        assert!(!RecapError::FetchFailed("404".into()).is_client_error());
        assert!(!RecapError::Timeout {
            stage: Stage::Fetch,
            seconds: 5
        }
        .is_client_error());
    }

    #[test]
    fn test_timeout_message() {
        let err = RecapError::Timeout {
            stage: Stage::Extraction,
            seconds: 30,
        };
        assert_eq!(err.to_string(), "audio extraction timed out after 30s");
    }
}
