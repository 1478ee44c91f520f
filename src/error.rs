//! RagRelay error types

use thiserror::Error;

/// RagRelay error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing credential or setting)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request validation error (missing or malformed field)
    #[error("{0}")]
    Validation(String),

    /// Upstream service failure (embedding, vector store, or LLM API)
    #[error("Upstream error: {message}")]
    Upstream {
        /// HTTP status reported by the upstream, when a response was received
        status: Option<u16>,
        message: String,
        /// Upstream error payload, relayed to the caller when present
        detail: Option<serde_json::Value>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Build an upstream error from a non-2xx response status and its body.
    ///
    /// The body's `error` field (if any) is kept so the front door can relay
    /// the upstream payload to the caller.
    pub fn upstream(status: u16, body: serde_json::Value) -> Self {
        let detail = body.get("error").cloned();
        let message = match &detail {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("upstream request failed")
                .to_string(),
            // Pinecone-style bodies carry a top-level `message` instead
            None => body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("upstream request failed")
                .to_string(),
        };
        Error::Upstream {
            status: Some(status),
            message,
            detail,
        }
    }
}

/// Result type alias for RagRelay operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_from_string_error() {
        let err = Error::upstream(429, serde_json::json!({"error": "rate limited"}));
        match err {
            Error::Upstream {
                status,
                message,
                detail,
            } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "rate limited");
                assert_eq!(detail, Some(serde_json::json!("rate limited")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upstream_from_object_error() {
        let body = serde_json::json!({"error": {"message": "model not found", "code": 404}});
        let err = Error::upstream(404, body);
        match err {
            Error::Upstream {
                status, message, ..
            } => {
                assert_eq!(status, Some(404));
                assert_eq!(message, "model not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upstream_without_error_field() {
        let err = Error::upstream(500, serde_json::json!({"detail": "boom"}));
        match err {
            Error::Upstream {
                status,
                detail,
                message,
            } => {
                assert_eq!(status, Some(500));
                assert!(detail.is_none());
                assert_eq!(message, "upstream request failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
