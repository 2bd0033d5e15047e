//! Summarization pipeline.
//!
//! Detect the source language, route the text through the pivot language,
//! summarize it, and translate the summary into the requested language.
//! Every gateway failure ends the request with an `Unsupported` outcome
//! instead of an error.

use crate::config::Config;
use crate::error::{GatewayError, GatewayKind, RequestError};
use crate::i18n::{self, fill, Language, LanguageCatalog, UNSUPPORTED_MESSAGES};
use crate::metrics::GatewayMetrics;
use crate::retry::{with_retry_if, RetryConfig};
use crate::summarizer::{LengthBounds, SummarizationGateway};
use crate::translation::TranslationGateway;
use std::sync::Arc;
use tracing::{info, warn};

/// Input for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizationRequest {
    text: String,
    bounds: LengthBounds,
    output_language: Option<String>,
    input_language: Option<String>,
}

impl SummarizationRequest {
    /// Rejects text that is empty after trimming.
    pub fn new(text: impl Into<String>, bounds: LengthBounds) -> Result<Self, RequestError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RequestError::EmptyText);
        }

        Ok(Self {
            text,
            bounds,
            output_language: None,
            input_language: None,
        })
    }

    /// Language the caller wants the summary in.
    pub fn with_output_language(mut self, code: impl Into<String>) -> Self {
        self.output_language = Some(code.into());
        self
    }

    /// Known source language; skips detection when the catalog has it.
    pub fn with_input_language(mut self, code: impl Into<String>) -> Self {
        self.input_language = Some(code.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bounds(&self) -> LengthBounds {
        self.bounds
    }

    pub fn output_language(&self) -> Option<&str> {
        self.output_language.as_deref()
    }

    pub fn input_language(&self) -> Option<&str> {
        self.input_language.as_deref()
    }
}

/// Why a request produced no summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The source language has no translation targets at all.
    SourceLanguage,
    /// Translating the input into the pivot language failed.
    SourceToPivot,
    /// Translating the pivot summary into the output language failed.
    PivotToTarget,
    /// Translating a short input straight into the output language failed.
    SourceToTarget { source: Language },
    /// The summarization service failed.
    Summarization,
}

impl UnsupportedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnsupportedReason::SourceLanguage => "source language not supported",
            UnsupportedReason::SourceToPivot => "source-to-pivot translation unavailable",
            UnsupportedReason::PivotToTarget => "pivot-to-target translation unavailable",
            UnsupportedReason::SourceToTarget { .. } => "source-to-target translation unavailable",
            UnsupportedReason::Summarization => "summarization unavailable",
        }
    }
}

/// Result of one pipeline run. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizationOutcome {
    Summary {
        text: String,
        language: Language,
    },
    Unsupported {
        reason: UnsupportedReason,
        /// The language the failing step was working with
        language: Language,
    },
}

impl SummarizationOutcome {
    pub fn is_summary(&self) -> bool {
        matches!(self, SummarizationOutcome::Summary { .. })
    }

    pub fn language(&self) -> Language {
        match self {
            SummarizationOutcome::Summary { language, .. }
            | SummarizationOutcome::Unsupported { language, .. } => *language,
        }
    }

    /// Human-readable explanation for `Unsupported` outcomes.
    pub fn message(&self, catalog: &LanguageCatalog) -> Option<String> {
        let SummarizationOutcome::Unsupported { reason, language } = self else {
            return None;
        };

        let pivot = catalog.pivot();
        let pivot_name = catalog.display_name(pivot.code());
        let name = catalog.display_name(language.code());

        let message = match reason {
            UnsupportedReason::SourceLanguage => {
                fill(UNSUPPORTED_MESSAGES.source_language, &[("source", name)])
            }
            UnsupportedReason::SourceToPivot => fill(
                UNSUPPORTED_MESSAGES.source_to_pivot,
                &[("source", name), ("pivot", pivot_name)],
            ),
            UnsupportedReason::PivotToTarget => fill(
                UNSUPPORTED_MESSAGES.pivot_to_target,
                &[("pivot", pivot_name), ("target", name)],
            ),
            UnsupportedReason::SourceToTarget { source } => fill(
                UNSUPPORTED_MESSAGES.source_to_target,
                &[("source", catalog.display_name(source.code())), ("target", name)],
            ),
            UnsupportedReason::Summarization => UNSUPPORTED_MESSAGES.summarization.to_string(),
        };

        Some(message)
    }
}

/// The orchestrator. Holds only immutable state, so one instance serves
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct SummaryPipeline {
    catalog: Arc<LanguageCatalog>,
    translator: TranslationGateway,
    summarizer: SummarizationGateway,
    retry: RetryConfig,
    metrics: Arc<GatewayMetrics>,
}

impl SummaryPipeline {
    pub fn new(
        catalog: Arc<LanguageCatalog>,
        translator: TranslationGateway,
        summarizer: SummarizationGateway,
        retry: RetryConfig,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            catalog,
            translator,
            summarizer,
            retry,
            metrics,
        }
    }

    /// Wire both gateways to the endpoints and retry policy in `config`.
    pub fn from_config(
        config: &Config,
        client: reqwest::Client,
        catalog: Arc<LanguageCatalog>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self::new(
            Arc::clone(&catalog),
            TranslationGateway::new(client.clone(), config, Arc::clone(&catalog)),
            SummarizationGateway::new(client, config),
            RetryConfig::gateway(config.gateway_max_attempts),
            metrics,
        )
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// The caller's hint when the catalog knows it, otherwise detection.
    pub fn source_language(&self, request: &SummarizationRequest) -> Language {
        request
            .input_language()
            .and_then(|code| self.catalog.resolve(code))
            .unwrap_or_else(|| i18n::detect(&self.catalog, request.text()))
    }

    /// Run the full pipeline for one request.
    pub async fn produce_summary(&self, request: &SummarizationRequest) -> SummarizationOutcome {
        let pivot = self.catalog.pivot();

        // 1. Source language
        let source = self.source_language(request);

        // 2. Output languages reachable from the source
        let targets = self.catalog.supported_targets(source);

        // 3. Effective target: requested when reachable, else the first target
        let Some(target) = targets.resolve(request.output_language()) else {
            info!("No translation targets for '{}'", source);
            return self.unsupported(UnsupportedReason::SourceLanguage, source);
        };

        info!(
            "Summarizing {} chars: source='{}', target='{}'",
            request.text().chars().count(),
            source,
            target
        );

        // 4. Bring the text into the pivot language
        let working_text = if source != pivot {
            match self.translate(request.text(), source, pivot).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Source-to-pivot translation failed: {}", e);
                    return self.unsupported(UnsupportedReason::SourceToPivot, source);
                }
            }
        } else {
            request.text().to_string()
        };

        // 5. Summarize in the pivot language
        let pivot_summary = match self.summarize(&working_text, request.bounds()).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summarization failed: {}", e);
                return self.unsupported(UnsupportedReason::Summarization, pivot);
            }
        };

        // 6. Short-input bypass: the "summary" is longer than the input
        let input_len = request.text().trim().chars().count();
        let summary_len = pivot_summary.trim().chars().count();
        if input_len < summary_len {
            info!(
                "Summary ({} chars) longer than input ({} chars), returning the input",
                summary_len, input_len
            );

            if target == source {
                return SummarizationOutcome::Summary {
                    text: request.text().to_string(),
                    language: source,
                };
            }

            return match self.translate(request.text(), source, target).await {
                Ok(text) => SummarizationOutcome::Summary {
                    text,
                    language: target,
                },
                Err(e) => {
                    warn!("Direct translation of short input failed: {}", e);
                    self.unsupported(UnsupportedReason::SourceToTarget { source }, target)
                }
            };
        }

        // 7. Bring the summary into the output language
        if target == pivot {
            return SummarizationOutcome::Summary {
                text: pivot_summary,
                language: pivot,
            };
        }

        match self.translate(&pivot_summary, pivot, target).await {
            Ok(text) => SummarizationOutcome::Summary {
                text,
                language: target,
            },
            Err(e) => {
                warn!("Pivot-to-target translation failed: {}", e);
                self.unsupported(UnsupportedReason::PivotToTarget, target)
            }
        }
    }

    fn unsupported(&self, reason: UnsupportedReason, language: Language) -> SummarizationOutcome {
        self.metrics.record_unsupported();
        SummarizationOutcome::Unsupported { reason, language }
    }

    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, GatewayError> {
        if source == target {
            return Ok(text.to_string());
        }

        with_retry_if(
            &self.retry,
            &format!("Translation {} -> {}", source, target),
            || async move {
                self.metrics.record_call(GatewayKind::Translation);
                let result = self.translator.translate(text, source, target).await;
                if result.is_err() {
                    self.metrics.record_failure(GatewayKind::Translation);
                }
                result
            },
            GatewayError::is_retryable,
        )
        .await
    }

    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String, GatewayError> {
        with_retry_if(
            &self.retry,
            "Summarization",
            || async move {
                self.metrics.record_call(GatewayKind::Summarization);
                let result = self.summarizer.summarize(text, bounds).await;
                if result.is_err() {
                    self.metrics.record_failure(GatewayKind::Summarization);
                }
                result
            },
            GatewayError::is_retryable,
        )
        .await
    }
}
