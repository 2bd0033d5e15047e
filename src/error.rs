//! Typed errors shared across the crate.

use std::fmt;

/// Which remote service a gateway error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Translation,
    Summarization,
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayKind::Translation => f.write_str("Translation API Error"),
            GatewayKind::Summarization => f.write_str("Summarization API Error"),
        }
    }
}

/// Failure of a single call to a remote model service.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network failure or timeout before a response arrived.
    #[error("{kind}: request failed: {source}")]
    Transport {
        kind: GatewayKind,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{kind}: {status} - {body}")]
    Status {
        kind: GatewayKind,
        status: u16,
        body: String,
    },

    /// The service answered 2xx with a body that is not JSON.
    #[error("{kind}: invalid response body: {message}")]
    InvalidBody { kind: GatewayKind, message: String },
}

impl GatewayError {
    pub fn kind(&self) -> GatewayKind {
        match self {
            GatewayError::Transport { kind, .. }
            | GatewayError::Status { kind, .. }
            | GatewayError::InvalidBody { kind, .. } => *kind,
        }
    }

    /// Network errors, 429 and 5xx are worth retrying. Other 4xx are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport { .. } => true,
            GatewayError::Status { status, .. } => *status == 429 || *status >= 500,
            GatewayError::InvalidBody { .. } => false,
        }
    }
}

/// Failure while turning an upload or a web page into plain text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file type.")]
    UnsupportedFileType(String),

    #[error("Failed to extract text: {0}")]
    Failed(String),

    #[error("Failed to extract text: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// Failure to record feedback.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Feedback not saved. Missing data: {0}")]
    MissingField(&'static str),

    #[error("Feedback not saved. Rating is longer than {max} characters.")]
    RatingTooLong { max: usize },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to write export: {0}")]
    Export(String),
}

/// Invalid summarization request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("No text provided.")]
    EmptyText,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> GatewayError {
        GatewayError::Status {
            kind: GatewayKind::Translation,
            status,
            body: "body".to_string(),
        }
    }

    #[test]
    fn test_status_error_display_carries_prefix() {
        let err = status_error(503);
        assert_eq!(err.to_string(), "Translation API Error: 503 - body");

        let err = GatewayError::Status {
            kind: GatewayKind::Summarization,
            status: 400,
            body: "bad".to_string(),
        };
        assert!(err.to_string().starts_with("Summarization API Error"));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(status_error(429).is_retryable());
        assert!(status_error(500).is_retryable());
        assert!(status_error(503).is_retryable());
        assert!(!status_error(400).is_retryable());
        assert!(!status_error(401).is_retryable());
        assert!(!status_error(404).is_retryable());
    }

    #[test]
    fn test_invalid_body_not_retryable() {
        let err = GatewayError::InvalidBody {
            kind: GatewayKind::Summarization,
            message: "eof".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), GatewayKind::Summarization);
    }

    #[test]
    fn test_feedback_missing_field_message() {
        let err = FeedbackError::MissingField("original_text");
        assert!(err.to_string().contains("original_text"));
    }

    #[test]
    fn test_extract_error_messages() {
        assert_eq!(
            ExtractError::UnsupportedFileType("exe".into()).to_string(),
            "Unsupported file type."
        );
        assert_eq!(
            ExtractError::Failed("broken".into()).to_string(),
            "Failed to extract text: broken"
        );
    }
}
