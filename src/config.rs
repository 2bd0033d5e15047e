use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_TRANSLATION_MODEL: &str = "facebook/mbart-large-50-many-to-many-mmt";

#[derive(Debug, Clone)]
pub struct Config {
    // Hugging Face inference API
    pub hf_api_token: String,
    pub hf_api_url: String,
    pub summarization_model: String,
    pub translation_model: String,

    // Outbound calls
    pub request_timeout_secs: u64,
    pub gateway_max_attempts: u32,

    // Feedback storage
    pub database_url: String,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            hf_api_token: std::env::var("HF_TOKEN").context(
                "HF_TOKEN not set. Please set the HF_TOKEN environment variable.",
            )?,
            hf_api_url: std::env::var("HF_API_URL")
                .unwrap_or_else(|_| DEFAULT_HF_API_URL.to_string()),
            summarization_model: std::env::var("SUMMARIZATION_MODEL")
                .unwrap_or_else(|_| DEFAULT_SUMMARIZATION_MODEL.to_string()),
            translation_model: std::env::var("TRANSLATION_MODEL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATION_MODEL.to_string()),

            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            gateway_max_attempts: std::env::var("GATEWAY_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|attempts| *attempts >= 1)
                .unwrap_or(1),

            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://summaries.db".to_string()),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Endpoint of the summarization model.
    pub fn summarization_url(&self) -> String {
        model_url(&self.hf_api_url, &self.summarization_model)
    }

    /// Endpoint of the translation model.
    pub fn translation_url(&self) -> String {
        model_url(&self.hf_api_url, &self.translation_model)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// HTTP client shared by every outbound call, with the bounded timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()
            .context("Failed to build HTTP client")
    }
}

fn model_url(base: &str, model: &str) -> String {
    format!("{}/models/{}", base.trim_end_matches('/'), model)
}
