use crate::config::Config;
use crate::error::{GatewayError, GatewayKind};
use crate::gateway::{extract_text, post_json};
use serde::Serialize;
use tracing::{debug, info};

/// Response fields that may carry the summary, in priority order.
pub const SUMMARY_FIELDS: &[&str] = &["summary_text", "generated_text"];

pub const DEFAULT_MIN_LENGTH: u32 = 30;
pub const DEFAULT_MAX_LENGTH: u32 = 150;

/// Length bounds passed to the summarization model.
///
/// `min <= max` always holds: a minimum above the maximum is clamped down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthBounds {
    min_length: u32,
    max_length: u32,
}

impl LengthBounds {
    pub fn new(min_length: u32, max_length: u32) -> Self {
        Self {
            min_length: min_length.min(max_length),
            max_length,
        }
    }

    pub fn min_length(&self) -> u32 {
        self.min_length
    }

    pub fn max_length(&self) -> u32 {
        self.max_length
    }
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH)
    }
}

/// Inference request for the abstractive summarization model
#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    inputs: &'a str,
    parameters: LengthBounds,
}

/// Client for the remote abstractive-summarization service.
#[derive(Debug, Clone)]
pub struct SummarizationGateway {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl SummarizationGateway {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            url: config.summarization_url(),
            token: config.hf_api_token.clone(),
        }
    }

    /// Summarize `text` within `bounds`. One request, no retries.
    pub async fn summarize(
        &self,
        text: &str,
        bounds: LengthBounds,
    ) -> Result<String, GatewayError> {
        let request = SummaryRequest {
            inputs: text.trim(),
            parameters: bounds,
        };

        debug!(
            "Summarizing {} chars (min_length={}, max_length={})",
            request.inputs.chars().count(),
            bounds.min_length(),
            bounds.max_length()
        );

        let response = post_json(
            &self.client,
            &self.url,
            &self.token,
            &request,
            GatewayKind::Summarization,
        )
        .await?;

        let summary = extract_text(&response, SUMMARY_FIELDS);
        info!("Summary generated ({} chars)", summary.chars().count());
        Ok(summary)
    }
}
