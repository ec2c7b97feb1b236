//! Artifact classification by filename extension.

use crate::error::{RecapError, Result};
use serde::{Deserialize, Serialize};

/// Supported audio file extensions.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

/// Supported video file extensions (audio will be extracted).
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov"];

/// Supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::Docx => write!(f, "docx"),
        }
    }
}

/// What an uploaded artifact is, judged from its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Audio,
    Video,
    Document(DocumentKind),
    Unsupported,
}

impl ArtifactKind {
    /// Audio or video, i.e. something that can be transcribed.
    pub fn is_media(&self) -> bool {
        matches!(self, ArtifactKind::Audio | ArtifactKind::Video)
    }
}

/// Lower-cased substring after the last `.`, if any.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Classify a filename. Pure function of the lower-cased extension.
pub fn classify(filename: &str) -> ArtifactKind {
    let Some(ext) = extension(filename) else {
        return ArtifactKind::Unsupported;
    };
    let ext = ext.as_str();

    if AUDIO_EXTENSIONS.contains(&ext) {
        ArtifactKind::Audio
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        ArtifactKind::Video
    } else if ext == "pdf" {
        ArtifactKind::Document(DocumentKind::Pdf)
    } else if ext == "docx" {
        ArtifactKind::Document(DocumentKind::Docx)
    } else {
        ArtifactKind::Unsupported
    }
}

/// Classify and require an audio or video file.
pub fn require_media(filename: &str) -> Result<ArtifactKind> {
    let kind = classify(filename);
    if kind.is_media() {
        Ok(kind)
    } else {
        Err(RecapError::UnsupportedFormat(format!(
            "'{}' is not a supported audio or video file (expected one of: {})",
            filename,
            [AUDIO_EXTENSIONS, VIDEO_EXTENSIONS].concat().join(", ")
        )))
    }
}

/// Classify and require a PDF or DOCX document.
pub fn require_document(filename: &str) -> Result<DocumentKind> {
    match classify(filename) {
        ArtifactKind::Document(kind) => Ok(kind),
        _ => Err(RecapError::UnsupportedFormat(format!(
            "'{}' is not a supported document (expected pdf or docx)",
            filename
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify("song.mp3"), ArtifactKind::Audio);
        assert_eq!(classify("memo.wav"), ArtifactKind::Audio);
        assert_eq!(classify("voice.m4a"), ArtifactKind::Audio);
        assert_eq!(classify("clip.mp4"), ArtifactKind::Video);
        assert_eq!(classify("clip.mkv"), ArtifactKind::Video);
        assert_eq!(classify("clip.mov"), ArtifactKind::Video);
        assert_eq!(classify("paper.pdf"), ArtifactKind::Document(DocumentKind::Pdf));
        assert_eq!(classify("notes.docx"), ArtifactKind::Document(DocumentKind::Docx));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("video.MP4"), classify("video.mp4"));
        assert_eq!(classify("Report.PDF"), ArtifactKind::Document(DocumentKind::Pdf));
    }

    #[test]
    fn test_classify_uses_last_extension() {
        assert_eq!(classify("archive.mp4.xyz"), ArtifactKind::Unsupported);
        assert_eq!(classify("my.talk.mp3"), ArtifactKind::Audio);
    }

    #[test]
    fn test_classify_unsupported() {
        assert_eq!(classify("clip.xyz"), ArtifactKind::Unsupported);
        assert_eq!(classify("noextension"), ArtifactKind::Unsupported);
        assert_eq!(classify("trailingdot."), ArtifactKind::Unsupported);
        assert_eq!(classify("movie.avi"), ArtifactKind::Unsupported);
    }

    #[test]
    fn test_require_media() {
        assert!(require_media("clip.mov").is_ok());
        let err = require_media("paper.pdf").unwrap_err();
        assert!(matches!(err, RecapError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_require_document() {
        assert_eq!(require_document("a.DOCX").unwrap(), DocumentKind::Docx);
        assert!(matches!(
            require_document("a.mp3"),
            Err(RecapError::UnsupportedFormat(_))
        ));
    }
}
