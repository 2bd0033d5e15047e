use crate::config::Config;
use crate::error::{GatewayError, GatewayKind};
use crate::gateway::{extract_text, post_json};
use crate::i18n::{Language, LanguageCatalog};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Response fields that may carry the translated text, in priority order.
pub const TRANSLATION_FIELDS: &[&str] = &["translation_text", "generated_text"];

/// Inference request for the many-to-many translation model
#[derive(Debug, Serialize)]
struct TranslationRequest<'a> {
    inputs: &'a str,
    parameters: TranslationParameters,
}

#[derive(Debug, Serialize)]
struct TranslationParameters {
    src_lang: &'static str,
    tgt_lang: &'static str,
}

/// Client for the remote multilingual translation service.
#[derive(Debug, Clone)]
pub struct TranslationGateway {
    client: reqwest::Client,
    url: String,
    token: String,
    catalog: Arc<LanguageCatalog>,
}

impl TranslationGateway {
    pub fn new(client: reqwest::Client, config: &Config, catalog: Arc<LanguageCatalog>) -> Self {
        Self {
            client,
            url: config.translation_url(),
            token: config.hf_api_token.clone(),
            catalog,
        }
    }

    /// Translate `text` from `source` to `target`.
    ///
    /// Identity pairs return the text untouched without a network call.
    /// Otherwise exactly one request is made; failures are not retried here.
    pub async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, GatewayError> {
        if source == target {
            return Ok(text.to_string());
        }

        let request = TranslationRequest {
            inputs: text,
            parameters: TranslationParameters {
                src_lang: self.catalog.service_tag(source.code()),
                tgt_lang: self.catalog.service_tag(target.code()),
            },
        };

        debug!(
            "Translating {} chars {} -> {} ({} -> {})",
            text.chars().count(),
            source,
            target,
            request.parameters.src_lang,
            request.parameters.tgt_lang
        );

        let response = post_json(
            &self.client,
            &self.url,
            &self.token,
            &request,
            GatewayKind::Translation,
        )
        .await?;

        info!("Translation {} -> {} completed", source, target);
        Ok(extract_text(&response, TRANSLATION_FIELDS))
    }
}
