//! Plumbing shared by the translation and summarization gateways.

use crate::error::{GatewayError, GatewayKind};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// POST a JSON payload to a model endpoint and decode the JSON answer.
///
/// Exactly one request is sent. Non-success statuses and transport failures
/// come back as `GatewayError`, never as text.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    token: &str,
    payload: &T,
    kind: GatewayKind,
) -> Result<Value, GatewayError> {
    let response = client
        .post(url)
        .bearer_auth(token)
        .json(payload)
        .send()
        .await
        .map_err(|source| GatewayError::Transport { kind, source })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        warn!("{} from {}: {}", kind, url, status);
        return Err(GatewayError::Status { kind, status, body });
    }

    let body = response
        .text()
        .await
        .map_err(|source| GatewayError::Transport { kind, source })?;

    serde_json::from_str(&body).map_err(|e| GatewayError::InvalidBody {
        kind,
        message: e.to_string(),
    })
}

/// Pull the first available text field out of a model response.
///
/// Services answer either with a single object or with a list of objects;
/// only the first element of a list is considered. When none of `keys` is
/// present the raw JSON is returned as a string.
pub fn extract_text(value: &Value, keys: &[&str]) -> String {
    let candidate = match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    candidate
        .and_then(|item| {
            keys.iter()
                .find_map(|key| item.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const KEYS: &[&str] = &["translation_text", "generated_text"];

    #[test]
    fn test_extract_text_from_object() {
        let value = json!({"translation_text": "hola"});
        assert_eq!(extract_text(&value, KEYS), "hola");
    }

    #[test]
    fn test_extract_text_from_array_uses_first_element() {
        let value = json!([{"translation_text": "first"}, {"translation_text": "second"}]);
        assert_eq!(extract_text(&value, KEYS), "first");
    }

    #[test]
    fn test_extract_text_alternate_key() {
        let value = json!([{"generated_text": "generated"}]);
        assert_eq!(extract_text(&value, KEYS), "generated");
    }

    #[test]
    fn test_extract_text_key_priority() {
        let value = json!({"generated_text": "second", "translation_text": "first"});
        assert_eq!(extract_text(&value, KEYS), "first");
    }

    #[test]
    fn test_extract_text_unrecognized_shape_is_stringified() {
        let value = json!({"error": "loading"});
        assert_eq!(extract_text(&value, KEYS), r#"{"error":"loading"}"#);

        let empty = json!([]);
        assert_eq!(extract_text(&empty, KEYS), "[]");
    }

    #[test]
    fn test_extract_text_non_string_field_is_stringified() {
        let value = json!([{"translation_text": 42}]);
        assert_eq!(extract_text(&value, KEYS), r#"[{"translation_text":42}]"#);
    }

    #[tokio::test]
    async fn test_post_json_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/m"))
            .and(header("Authorization", "Bearer hf-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/models/m", mock_server.uri());
        let value = post_json(
            &reqwest::Client::new(),
            &url,
            "hf-test",
            &json!({"inputs": "x"}),
            GatewayKind::Translation,
        )
        .await
        .expect("Should succeed");

        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_post_json_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Model is loading"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/models/m", mock_server.uri());
        let err = post_json(
            &reqwest::Client::new(),
            &url,
            "t",
            &json!({}),
            GatewayKind::Summarization,
        )
        .await
        .unwrap_err();

        match &err {
            GatewayError::Status { status, body, .. } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "Model is loading");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().starts_with("Summarization API Error"));
    }

    #[tokio::test]
    async fn test_post_json_invalid_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/models/m", mock_server.uri());
        let err = post_json(
            &reqwest::Client::new(),
            &url,
            "t",
            &json!({}),
            GatewayKind::Translation,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GatewayError::InvalidBody { .. }));
    }

    #[tokio::test]
    async fn test_post_json_connection_error() {
        let err = post_json(
            &reqwest::Client::new(),
            "http://127.0.0.1:1/models/m",
            "t",
            &json!({}),
            GatewayKind::Translation,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GatewayError::Transport { .. }));
        assert!(err.is_retryable());
    }
}
