//! Request pipeline orchestrator for Recap.
//!
//! Each endpoint is one pipeline run: validate and classify the input, stage
//! it in scratch storage, call the adapters in order and assemble the result.
//! Every temp file a run creates is owned by its [`PipelineRun`], so it is
//! removed whether the run completes, fails, times out or unwinds.

use crate::audio::{AudioExtractor, FfmpegExtractor, RemoteFetcher, YtDlpFetcher};
use crate::config::{Settings, TimeoutSettings};
use crate::document::{DocumentReader, FileDocumentReader};
use crate::error::{RecapError, Result, Stage};
use crate::keywords::{KeywordExtractor, PhraseRankExtractor};
use crate::media::{self, ArtifactKind, DocumentKind};
use crate::scratch::{ScratchDir, TempHandle};
use crate::summarize::{SentenceCount, Summarizer, TextRankSummarizer};
use crate::transcription::{is_api_key_configured, Transcriber, WhisperTranscriber};
use bytes::Bytes;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// The adapters a pipeline is built from.
#[derive(Clone)]
pub struct Components {
    pub extractor: Arc<dyn AudioExtractor>,
    pub transcriber: Arc<dyn Transcriber>,
    pub documents: Arc<dyn DocumentReader>,
    pub fetcher: Arc<dyn RemoteFetcher>,
    pub summarizer: Arc<dyn Summarizer>,
    pub keywords: Arc<dyn KeywordExtractor>,
}

/// Raw upload plus the filename the client declared.
#[derive(Debug, Clone)]
pub struct UploadedArtifact {
    pub filename: String,
    pub bytes: Bytes,
}

/// Parameters of `/summarize`.
#[derive(Debug, Clone)]
pub struct SummarizeRequest {
    pub content: String,
    pub sentence_count: SentenceCount,
}

/// Parameters of `/keywords`.
#[derive(Debug, Clone)]
pub struct KeywordsRequest {
    pub content: String,
    pub keyword_count: usize,
}

/// Parameters of `/transcribe`.
#[derive(Debug, Clone)]
pub struct TranscribeUpload {
    pub artifact: UploadedArtifact,
    pub sentence_count: SentenceCount,
}

/// Parameters of `/youtube`.
#[derive(Debug, Clone)]
pub struct YoutubeRequest {
    pub link: String,
    pub sentence_count: SentenceCount,
}

/// Parameters of `/parse-document`.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub artifact: UploadedArtifact,
    pub sentence_count: SentenceCount,
}

/// What a pipeline run produces. Serializes to the endpoint's response body.
///
/// Transcriptions are always returned together with their summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProcessingResult {
    Summary { summary: String },
    Keywords { keywords: Vec<String> },
    Combined { transcription: String, summary: String },
}

/// Lifecycle of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Received,
    Validated,
    Extracting,
    Processing,
    Completed,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}

/// One execution of an endpoint's pipeline. Owns the run's temp files.
pub struct PipelineRun<'a> {
    id: String,
    endpoint: &'static str,
    state: RunState,
    scratch: &'a ScratchDir,
    handles: Vec<TempHandle>,
}

impl<'a> PipelineRun<'a> {
    fn start(scratch: &'a ScratchDir, endpoint: &'static str) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        debug!(run = %id, endpoint, "Run received");
        Self {
            id,
            endpoint,
            state: RunState::Received,
            scratch,
            handles: Vec::new(),
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!(run = %self.id, from = ?self.state, to = ?next, "Run state");
        self.state = next;
    }

    /// Reserve a scratch file for this run and return its path.
    fn acquire(&mut self, suffix: &str) -> Result<PathBuf> {
        let handle = self.scratch.acquire(&self.id, suffix)?;
        let path = handle.path().to_path_buf();
        self.handles.push(handle);
        Ok(path)
    }

    /// Stage an upload in scratch storage, keeping its extension.
    async fn stage_upload(&mut self, artifact: &UploadedArtifact) -> Result<PathBuf> {
        let suffix = media::extension(&artifact.filename)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let path = self.acquire(&suffix)?;
        tokio::fs::write(&path, &artifact.bytes).await?;
        Ok(path)
    }

    /// Release every handle, then sweep tool leftovers sharing the run's token.
    fn cleanup(&mut self) -> usize {
        let released = self.handles.len();
        for handle in self.handles.drain(..) {
            handle.release();
        }
        self.scratch.sweep(&self.id);
        released
    }

    /// Enter a terminal state and release every temp file.
    fn finish<T>(mut self, outcome: Result<T>) -> Result<T> {
        let released = self.cleanup();

        match &outcome {
            Ok(_) => {
                self.advance(RunState::Completed);
                info!(run = %self.id, endpoint = self.endpoint, released, "Run completed");
            }
            Err(e) => {
                self.advance(RunState::Failed);
                warn!(run = %self.id, endpoint = self.endpoint, released, error = %e, "Run failed");
            }
        }
        outcome
    }
}

impl Drop for PipelineRun<'_> {
    fn drop(&mut self) {
        // Reached without `finish` only when the request future is dropped or unwinds
        if !self.state.is_terminal() {
            let released = self.cleanup();
            warn!(
                run = %self.id,
                endpoint = self.endpoint,
                state = ?self.state,
                released,
                "Run abandoned"
            );
        }
    }
}

/// The main orchestrator for the Recap pipelines.
pub struct Orchestrator {
    components: Components,
    scratch: ScratchDir,
    timeouts: TimeoutSettings,
}

impl Orchestrator {
    /// Build the production adapters. The transcriber is created here, once.
    pub fn new(settings: &Settings) -> Result<Self> {
        let scratch = ScratchDir::new(settings.scratch_dir())?;
        let tools = &settings.tools;

        let components = Components {
            extractor: Arc::new(FfmpegExtractor::new(&tools.ffmpeg)),
            transcriber: Arc::new(WhisperTranscriber::from_settings(
                &settings.transcription,
                tools,
            )?),
            documents: Arc::new(FileDocumentReader),
            fetcher: Arc::new(YtDlpFetcher::new(&tools.yt_dlp, &tools.ffmpeg)),
            summarizer: Arc::new(TextRankSummarizer),
            keywords: Arc::new(PhraseRankExtractor),
        };

        info!("Using transcription model {}", settings.transcription.model);
        if !is_api_key_configured() {
            warn!("OPENAI_API_KEY is not set; transcription requests will fail");
        }

        Ok(Self::with_components(
            scratch,
            settings.timeouts.clone(),
            components,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        scratch: ScratchDir,
        timeouts: TimeoutSettings,
        components: Components,
    ) -> Self {
        Self {
            components,
            scratch,
            timeouts,
        }
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Summarize text directly.
    #[instrument(skip_all, fields(content_len = request.content.len()))]
    pub async fn summarize_text(&self, request: SummarizeRequest) -> Result<ProcessingResult> {
        let mut run = PipelineRun::start(&self.scratch, "summarize");
        let outcome: Result<ProcessingResult> = async {
            let count = request.sentence_count.validate()?;
            run.advance(RunState::Validated);

            run.advance(RunState::Processing);
            let summary = self.summarize(request.content.clone(), count).await?;
            Ok(ProcessingResult::Summary { summary })
        }
        .await;
        run.finish(outcome)
    }

    /// Rank keyphrases of a text.
    #[instrument(skip_all, fields(content_len = request.content.len()))]
    pub async fn extract_keywords(&self, request: KeywordsRequest) -> Result<ProcessingResult> {
        let mut run = PipelineRun::start(&self.scratch, "keywords");
        let outcome: Result<ProcessingResult> = async {
            if request.keyword_count == 0 {
                return Err(RecapError::InvalidInput(
                    "kw_count must be at least 1".to_string(),
                ));
            }
            run.advance(RunState::Validated);

            run.advance(RunState::Processing);
            let extractor = self.components.keywords.clone();
            let count = request.keyword_count;
            let content = request.content;
            let keywords = self
                .blocking(Stage::Keywords, move || extractor.extract(&content, count))
                .await?;
            Ok(ProcessingResult::Keywords { keywords })
        }
        .await;
        run.finish(outcome)
    }

    /// Transcribe an uploaded audio/video file and summarize the transcription.
    #[instrument(skip_all, fields(filename = %upload.artifact.filename))]
    pub async fn transcribe_upload(&self, upload: TranscribeUpload) -> Result<ProcessingResult> {
        let mut run = PipelineRun::start(&self.scratch, "transcribe");
        let outcome = self.run_transcribe(&mut run, upload).await;
        run.finish(outcome)
    }

    async fn run_transcribe(
        &self,
        run: &mut PipelineRun<'_>,
        upload: TranscribeUpload,
    ) -> Result<ProcessingResult> {
        let count = upload.sentence_count.validate()?;
        let kind = media::require_media(&upload.artifact.filename)?;
        run.advance(RunState::Validated);

        let input = run.stage_upload(&upload.artifact).await?;

        let audio = if kind == ArtifactKind::Video {
            run.advance(RunState::Extracting);
            let audio = run.acquire(".mp3")?;
            self.bounded(
                Stage::Extraction,
                self.components.extractor.extract_audio(&input, &audio),
            )
            .await?;
            audio
        } else {
            input
        };

        run.advance(RunState::Processing);
        self.transcribe_and_summarize(&audio, count).await
    }

    /// Fetch a remote video's audio, transcribe it and summarize.
    #[instrument(skip_all, fields(link = %request.link))]
    pub async fn summarize_youtube(&self, request: YoutubeRequest) -> Result<ProcessingResult> {
        let mut run = PipelineRun::start(&self.scratch, "youtube");
        let outcome: Result<ProcessingResult> = async {
            let count = request.sentence_count.validate()?;
            run.advance(RunState::Validated);

            run.advance(RunState::Processing);
            let audio = run.acquire(".mp3")?;
            self.bounded(
                Stage::Fetch,
                self.components.fetcher.fetch_audio(&request.link, &audio),
            )
            .await?;
            self.transcribe_and_summarize(&audio, count).await
        }
        .await;
        run.finish(outcome)
    }

    /// Extract a document's text and summarize it.
    #[instrument(skip_all, fields(filename = %upload.artifact.filename))]
    pub async fn summarize_document(&self, upload: DocumentUpload) -> Result<ProcessingResult> {
        let mut run = PipelineRun::start(&self.scratch, "parse-document");
        let outcome: Result<ProcessingResult> = async {
            let count = upload.sentence_count.validate()?;
            let kind = media::require_document(&upload.artifact.filename)?;
            run.advance(RunState::Validated);

            let input = run.stage_upload(&upload.artifact).await?;

            run.advance(RunState::Processing);
            let text = self.read_document(input, kind).await?;
            let summary = self.summarize(text, count).await?;
            Ok(ProcessingResult::Summary { summary })
        }
        .await;
        run.finish(outcome)
    }

    async fn transcribe_and_summarize(
        &self,
        audio: &Path,
        count: SentenceCount,
    ) -> Result<ProcessingResult> {
        let transcription = self
            .bounded(
                Stage::Transcription,
                self.components.transcriber.transcribe(audio),
            )
            .await?;
        debug!(chars = transcription.len(), "Transcription complete");

        let summary = self.summarize(transcription.clone(), count).await?;
        Ok(ProcessingResult::Combined {
            transcription,
            summary,
        })
    }

    async fn read_document(&self, path: PathBuf, kind: DocumentKind) -> Result<String> {
        let reader = self.components.documents.clone();
        self.blocking(Stage::Document, move || reader.read_text(&path, kind))
            .await
    }

    /// Run the summarizer and join its sentences with single spaces.
    async fn summarize(&self, text: String, count: SentenceCount) -> Result<String> {
        let sentence_count = count.resolve(&text);
        debug!(sentence_count, "Summarizing");

        let summarizer = self.components.summarizer.clone();
        let sentences = self
            .blocking(Stage::Summarization, move || {
                summarizer.summarize(&text, sentence_count)
            })
            .await?;
        Ok(sentences.join(" "))
    }

    fn timeout_for(&self, stage: Stage) -> u64 {
        let t = &self.timeouts;
        match stage {
            Stage::Extraction => t.extraction,
            Stage::Transcription => t.transcription,
            Stage::Document => t.document,
            Stage::Fetch => t.fetch,
            Stage::Summarization => t.summarization,
            Stage::Keywords => t.keywords,
        }
    }

    /// Bound an adapter call by its stage timeout.
    async fn bounded<T>(&self, stage: Stage, call: impl Future<Output = Result<T>>) -> Result<T> {
        let seconds = self.timeout_for(stage);
        match tokio::time::timeout(TimeoutSettings::duration(seconds), call).await {
            Ok(result) => result,
            Err(_) => Err(RecapError::Timeout { stage, seconds }),
        }
    }

    /// Run a synchronous adapter on the blocking pool, bounded by its stage timeout.
    async fn blocking<T, F>(&self, stage: Stage, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.bounded(stage, async move {
            tokio::task::spawn_blocking(call).await?
        })
        .await
    }
}
