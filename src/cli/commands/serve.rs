//! HTTP API server.
//!
//! Exposes the summarization, transcription, keyword and document pipelines
//! as JSON/multipart endpoints.

use crate::cli::Output;
use crate::config::{RequestDefaults, Settings};
use crate::error::RecapError;
use crate::orchestrator::{
    DocumentUpload, KeywordsRequest, Orchestrator, ProcessingResult, SummarizeRequest,
    TranscribeUpload, UploadedArtifact, YoutubeRequest,
};
use crate::summarize::SentenceCount;
use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        rejection::JsonRejection,
        DefaultBodyLimit, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub defaults: RequestDefaults,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;

    let stale_after = Duration::from_secs(settings.general.stale_after_minutes * 60);
    orchestrator.scratch().purge_stale(stale_after)?;

    let max_upload_bytes = settings.server.max_upload_mb * 1024 * 1024;
    let state = Arc::new(AppState {
        orchestrator,
        defaults: settings.defaults.clone(),
    });
    let app = router(state, max_upload_bytes);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Recap API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Summarize", "POST /summarize");
    Output::kv("Transcribe", "POST /transcribe");
    Output::kv("Keywords", "POST /keywords");
    Output::kv("YouTube", "POST /youtube");
    Output::kv("Parse Document", "POST /parse-document");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the router. Every endpoint also answers with a trailing slash.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let endpoints: [(&str, MethodRouter<Arc<AppState>>); 6] = [
        ("/health", get(health)),
        ("/summarize", post(summarize)),
        ("/transcribe", post(transcribe)),
        ("/keywords", post(keywords)),
        ("/youtube", post(youtube)),
        ("/parse-document", post(parse_document)),
    ];

    let mut router = Router::new();
    for (path, handler) in endpoints {
        router = router
            .route(path, handler.clone())
            .route(&format!("{}/", path), handler);
    }

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SummarizeBody {
    content: String,
    #[serde(default)]
    sentence_count: Option<usize>,
}

#[derive(Deserialize)]
struct KeywordsBody {
    content: String,
    #[serde(default)]
    kw_count: Option<usize>,
}

#[derive(Deserialize)]
struct YoutubeBody {
    #[serde(default)]
    link: String,
    #[serde(default)]
    sentence_count: Option<usize>,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// An error rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<RecapError> for ApiError {
    fn from(err: RecapError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: client_status(rejection.status()),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: client_status(err.status()),
            detail: err.body_text(),
        }
    }
}

/// Malformed bodies are 400; only an oversized body keeps its own status.
fn client_status(status: StatusCode) -> StatusCode {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        status
    } else {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

type ApiResult = Result<Json<ProcessingResult>, ApiError>;

/// A multipart upload: the `file` part and the optional `sentence_count` field.
struct UploadForm {
    artifact: UploadedArtifact,
    sentence_count: Option<usize>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut artifact = None;
    let mut sentence_count = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                artifact = Some(UploadedArtifact { filename, bytes });
            }
            "sentence_count" => {
                let text = field.text().await?;
                sentence_count = Some(parse_count(&text)?);
            }
            _ => {}
        }
    }

    let artifact = artifact
        .ok_or_else(|| RecapError::InvalidInput("missing multipart field 'file'".to_string()))?;
    Ok(UploadForm {
        artifact,
        sentence_count,
    })
}

fn parse_count(text: &str) -> Result<usize, RecapError> {
    text.trim().parse::<usize>().map_err(|_| {
        RecapError::InvalidInput(format!("sentence_count must be a positive integer, got '{}'", text))
    })
}

fn sentence_count(requested: Option<usize>, defaults: &RequestDefaults) -> SentenceCount {
    SentenceCount::Exact(requested.unwrap_or(defaults.sentence_count))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;
    let result = state
        .orchestrator
        .summarize_text(SummarizeRequest {
            content: body.content,
            sentence_count: sentence_count(body.sentence_count, &state.defaults),
        })
        .await?;
    Ok(Json(result))
}

async fn transcribe(State(state): State<Arc<AppState>>, multipart: Multipart) -> ApiResult {
    let form = read_upload(multipart).await?;
    let result = state
        .orchestrator
        .transcribe_upload(TranscribeUpload {
            artifact: form.artifact,
            sentence_count: sentence_count(form.sentence_count, &state.defaults),
        })
        .await?;
    Ok(Json(result))
}

async fn keywords(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<KeywordsBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;
    let result = state
        .orchestrator
        .extract_keywords(KeywordsRequest {
            content: body.content,
            keyword_count: body.kw_count.unwrap_or(state.defaults.keyword_count),
        })
        .await?;
    Ok(Json(result))
}

async fn youtube(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<YoutubeBody>, JsonRejection>,
) -> ApiResult {
    let Json(body) = payload?;
    let result = state
        .orchestrator
        .summarize_youtube(YoutubeRequest {
            link: body.link,
            sentence_count: sentence_count(body.sentence_count, &state.defaults),
        })
        .await?;
    Ok(Json(result))
}

async fn parse_document(State(state): State<Arc<AppState>>, multipart: Multipart) -> ApiResult {
    let form = read_upload(multipart).await?;
    let result = state
        .orchestrator
        .summarize_document(DocumentUpload {
            artifact: form.artifact,
            sentence_count: SentenceCount::Auto,
        })
        .await?;
    Ok(Json(result))
}
