//! Recap - Media and Document Summarization Service
//!
//! A small HTTP service that turns audio, video, YouTube links and documents
//! into text and condenses it into short extractive summaries.
//!
//! # Overview
//!
//! Recap allows you to:
//! - Summarize plain text with a chosen number of sentences
//! - Transcribe uploaded audio/video files and summarize the transcript
//! - Fetch and transcribe the audio of a YouTube video
//! - Extract and summarize the text of PDF and DOCX documents
//! - Rank the keyphrases of a text
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `media` - Filename based artifact classification
//! - `scratch` - Per-request temp files with guaranteed cleanup
//! - `audio` - Audio extraction, remote fetching and splitting
//! - `transcription` - Speech-to-text transcription
//! - `document` - PDF and DOCX text extraction
//! - `summarize` - Extractive summarization
//! - `keywords` - Keyphrase ranking
//! - `orchestrator` - Pipeline coordination
//! - `cli` - Command line and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::orchestrator::{Orchestrator, SummarizeRequest};
//! use recap::summarize::SentenceCount;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let result = orchestrator
//!         .summarize_text(SummarizeRequest {
//!             content: "First point. Second point. Third point.".to_string(),
//!             sentence_count: SentenceCount::Exact(2),
//!         })
//!         .await?;
//!     println!("{}", serde_json::to_string(&result)?);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod keywords;
pub mod media;
pub mod orchestrator;
pub mod scratch;
pub mod summarize;
pub mod transcription;

pub use error::{RecapError, Result};
