//! HTTP surface: JSON API, feedback form and CSV export.

use crate::config::Config;
use crate::db::{FeedbackRecord, FeedbackStore, NewFeedback};
use crate::error::{ExtractError, FeedbackError, RequestError};
use crate::extract::{extract_document_text, fetch_page_text};
use crate::i18n::{self, Language, LanguageCatalog};
use crate::metrics::{GatewayMetrics, MetricsReport};
use crate::pipeline::{
    SummarizationOutcome, SummarizationRequest, SummaryPipeline, UnsupportedReason,
};
use crate::summarizer::{LengthBounds, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Largest accepted request body (uploads included).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const EXPORT_FILENAME: &str = "summaries_feedback.csv";

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<SummaryPipeline>,
    store: FeedbackStore,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(pipeline: SummaryPipeline, store: FeedbackStore, http: reqwest::Client) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            store,
            http,
        }
    }

    /// Wire the pipeline, the feedback store and the shared HTTP client.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let http = config.http_client()?;
        let catalog = Arc::new(LanguageCatalog::builtin());
        let metrics = Arc::new(GatewayMetrics::new());
        let pipeline = SummaryPipeline::from_config(config, http.clone(), catalog, metrics);

        let store = FeedbackStore::connect(&config.database_url)
            .await
            .context("Failed to open feedback store")?;

        Ok(Self::new(pipeline, store, http))
    }

    pub fn pipeline(&self) -> &SummaryPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &FeedbackStore {
        &self.store
    }

    fn catalog(&self) -> &LanguageCatalog {
        self.pipeline.catalog()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/summarize", post(summarize))
        .route("/api/languages", post(languages))
        .route("/api/history/recent", get(recent_history))
        .route("/api/metrics", get(metrics))
        .route("/feedback", post(submit_feedback))
        .route("/history", get(history))
        .route("/export", get(export))
        .route("/extract_url_text", post(extract_url_text))
        .route("/extract_file_text", post(extract_file_text))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Errors ====================

/// Errors a handler can answer with. Rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("No URL provided.")]
    MissingUrl,

    #[error("No file uploaded.")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    Upload(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Request(_)
            | ApiError::MissingUrl
            | ApiError::MissingFile
            | ApiError::Upload(_)
            | ApiError::Extract(ExtractError::UnsupportedFileType(_))
            | ApiError::Feedback(FeedbackError::MissingField(_))
            | ApiError::Feedback(FeedbackError::RatingTooLong { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Extract(_) | ApiError::Feedback(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Feedback(FeedbackError::MissingField(_)) => {
                "Feedback not saved. Missing data.".to_string()
            }
            ApiError::Feedback(err @ FeedbackError::RatingTooLong { .. }) => err.to_string(),
            ApiError::Feedback(_) => "Feedback not saved.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }

        (status, Json(serde_json::json!({ "error": self.message() }))).into_response()
    }
}

// ==================== Summarization ====================

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    #[serde(default)]
    pub text: String,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub language: Option<String>,
    pub input_language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SummarizeResponse {
    Ok {
        summary: String,
        language: Language,
        detected_language: Language,
    },
    Unsupported {
        message: String,
        language: Language,
        detected_language: Language,
    },
}

async fn summarize(
    State(state): State<AppState>,
    Json(body): Json<SummarizeBody>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let bounds = LengthBounds::new(
        body.min_length.unwrap_or(DEFAULT_MIN_LENGTH),
        body.max_length.unwrap_or(DEFAULT_MAX_LENGTH),
    );

    let mut request = SummarizationRequest::new(body.text, bounds)?;
    if let Some(code) = body.language.filter(|code| !code.is_empty()) {
        request = request.with_output_language(code);
    }
    if let Some(code) = body.input_language.filter(|code| !code.is_empty()) {
        request = request.with_input_language(code);
    }

    let pipeline = state.pipeline();
    let detected_language = pipeline.source_language(&request);
    let outcome = pipeline.produce_summary(&request).await;

    let response = match outcome {
        SummarizationOutcome::Summary { text, language } => SummarizeResponse::Ok {
            summary: text,
            language,
            detected_language,
        },
        unsupported => SummarizeResponse::Unsupported {
            message: unsupported
                .message(pipeline.catalog())
                .unwrap_or_default(),
            language: unsupported.language(),
            detected_language,
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct LanguagesBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub detected_language: Language,
    pub languages: Vec<LanguageOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Output languages offered for a piece of text.
async fn languages(
    State(state): State<AppState>,
    Json(body): Json<LanguagesBody>,
) -> Json<LanguagesResponse> {
    let catalog = state.catalog();
    let detected_language = i18n::detect(catalog, &body.text);
    let targets = catalog.supported_targets(detected_language);

    let message = targets.is_empty().then(|| {
        SummarizationOutcome::Unsupported {
            reason: UnsupportedReason::SourceLanguage,
            language: detected_language,
        }
        .message(catalog)
        .unwrap_or_default()
    });

    let languages = targets
        .iter()
        .map(|(language, name)| LanguageOption {
            code: language.code(),
            name,
            flag: catalog.flag(language.code()),
        })
        .collect();

    Json(LanguagesResponse {
        detected_language,
        languages,
        message,
    })
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(state.pipeline().metrics().report())
}

// ==================== Feedback ====================

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub generated_summary: String,
    #[serde(default)]
    pub user_feedback: String,
    pub improved_summary: Option<String>,
}

async fn submit_feedback(
    State(state): State<AppState>,
    Form(form): Form<FeedbackForm>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store()
        .append(NewFeedback::new(
            form.original_text,
            form.generated_summary,
            &form.user_feedback,
            form.improved_summary,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": record.id,
            "message": "Feedback saved successfully!",
        })),
    ))
}

async fn history(State(state): State<AppState>) -> Result<Json<Vec<FeedbackRecord>>, ApiError> {
    Ok(Json(state.store().list_descending(None).await?))
}

async fn recent_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedbackRecord>>, ApiError> {
    Ok(Json(state.store().recent().await?))
}

async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let csv = state.store().export_csv().await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment;filename={}", EXPORT_FILENAME),
            ),
        ],
        csv,
    ))
}

// ==================== Extraction ====================

#[derive(Debug, Deserialize)]
pub struct UrlBody {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtractedText {
    pub text: String,
}

async fn extract_url_text(
    State(state): State<AppState>,
    Json(body): Json<UrlBody>,
) -> Result<Json<ExtractedText>, ApiError> {
    let url = body
        .url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingUrl)?;

    let text = fetch_page_text(&state.http, &url).await?;
    Ok(Json(ExtractedText { text }))
}

async fn extract_file_text(mut multipart: Multipart) -> Result<Json<ExtractedText>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(e.to_string()))?;

        info!("Received upload '{}' ({} bytes)", filename, bytes.len());

        // PDF parsing is CPU-bound
        let text = tokio::task::spawn_blocking(move || extract_document_text(&filename, &bytes))
            .await
            .map_err(|e| ApiError::Extract(ExtractError::Failed(e.to_string())))??;

        return Ok(Json(ExtractedText { text }));
    }

    Err(ApiError::MissingFile)
}
