//! Chat completion proxy
//!
//! Forwards conversations to the upstream LLM API. The outbound payload is
//! exactly `{messages, model, stream}`; extra fields from the caller's body
//! are never forwarded. Supports buffered and streamed (SSE pass-through)
//! response modes.

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Inbound body of `POST /chat/completions`
///
/// Fields are optional so that validation, not deserialization, reports
/// what is missing. Unknown fields are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Option<Vec<ChatMessage>>,
    pub model: Option<String>,
    #[serde(default)]
    pub stream: bool,
    pub app_id: Option<String>,
    #[serde(default)]
    pub query_rag: bool,
}

/// A chat request that passed precondition checks
#[derive(Debug)]
pub struct ValidatedChat {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub stream: bool,
    pub query_rag: bool,
}

impl ChatRequest {
    /// Check preconditions and extract the conversation.
    ///
    /// The checks run in a fixed order (API key, then `messages`, then
    /// `appId`); callers depend on which error surfaces first.
    pub fn into_validated(self, api_key: &str) -> Result<ValidatedChat> {
        if api_key.trim().is_empty() {
            return Err(Error::Validation("LLM API key not configured".to_string()));
        }

        let messages = match self.messages {
            Some(m) if !m.is_empty() => m,
            _ => {
                return Err(Error::Validation(
                    "Missing \"messages\" in request body".to_string(),
                ))
            }
        };

        if self.app_id.as_deref().map_or(true, |v| v.trim().is_empty()) {
            return Err(Error::Validation(
                "Missing \"appId\" in request body".to_string(),
            ));
        }

        Ok(ValidatedChat {
            messages,
            model: self.model,
            stream: self.stream,
            query_rag: self.query_rag,
        })
    }
}

/// Outbound payload sent to the LLM API; nothing else is forwarded
#[derive(Debug, Serialize)]
pub struct CompletionPayload {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub stream: bool,
}

/// Client for the upstream chat-completion API
#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    default_model: String,
}

impl CompletionClient {
    pub fn new(
        client: reqwest::Client,
        api_url: String,
        api_key: String,
        default_model: String,
    ) -> Self {
        Self {
            client,
            api_url,
            api_key,
            default_model,
        }
    }

    /// The configured API key; empty when unconfigured
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Model used when the request does not name one
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Issue the upstream call and fail on a non-2xx status.
    async fn send(&self, payload: &CompletionPayload) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.api_url.trim_end_matches('/'));
        tracing::debug!(
            model = %payload.model,
            stream = payload.stream,
            messages = payload.messages.len(),
            "Forwarding completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            return Err(Error::upstream(status.as_u16(), body));
        }
        Ok(response)
    }

    /// Buffered mode: returns the upstream JSON body verbatim
    pub async fn complete(&self, payload: &CompletionPayload) -> Result<serde_json::Value> {
        let response = self.send(payload).await?;
        Ok(response.json().await?)
    }

    /// Streaming mode: returns the upstream byte stream untouched.
    ///
    /// Chunks are forwarded as they arrive, with no buffering or re-framing.
    /// The stream is pull-based, so consumers impose their own backpressure.
    pub async fn complete_stream(
        &self,
        payload: &CompletionPayload,
    ) -> Result<BoxStream<'static, reqwest::Result<Bytes>>> {
        let response = self.send(payload).await?;
        Ok(response.bytes_stream().boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(messages: bool, app_id: bool) -> ChatRequest {
        ChatRequest {
            messages: messages.then(|| vec![ChatMessage::user("hi")]),
            app_id: app_id.then(|| "app-1".to_string()),
            ..Default::default()
        }
    }

    fn make_client(server_url: &str) -> CompletionClient {
        CompletionClient::new(
            reqwest::Client::new(),
            server_url.to_string(),
            "llm-key".to_string(),
            "gpt-4o-mini".to_string(),
        )
    }

    #[test]
    fn test_validate_missing_api_key_first() {
        // Both the key and messages are missing; the key error must win
        let err = request_with(false, false).into_validated("").unwrap_err();
        assert_eq!(err.to_string(), "LLM API key not configured");
    }

    #[test]
    fn test_validate_missing_messages_before_app_id() {
        let err = request_with(false, false).into_validated("key").unwrap_err();
        assert_eq!(err.to_string(), "Missing \"messages\" in request body");
    }

    #[test]
    fn test_validate_empty_messages_rejected() {
        let request = ChatRequest {
            messages: Some(vec![]),
            app_id: Some("app-1".to_string()),
            ..Default::default()
        };
        let err = request.into_validated("key").unwrap_err();
        assert_eq!(err.to_string(), "Missing \"messages\" in request body");
    }

    #[test]
    fn test_validate_missing_app_id() {
        let err = request_with(true, false).into_validated("key").unwrap_err();
        assert_eq!(err.to_string(), "Missing \"appId\" in request body");
    }

    #[test]
    fn test_validate_ok() {
        let chat = request_with(true, true).into_validated("key").unwrap();
        assert_eq!(chat.messages.len(), 1);
        assert!(!chat.stream);
        assert!(!chat.query_rag);
    }

    #[test]
    fn test_chat_request_wire_names() {
        let request: ChatRequest = serde_json::from_str(
            r#"{
                "messages": [{"role": "user", "content": "hi"}],
                "appId": "app-1",
                "queryRag": true,
                "channel": "ignored",
                "userId": "ignored"
            }"#,
        )
        .unwrap();
        assert!(request.query_rag);
        assert_eq!(request.app_id.as_deref(), Some("app-1"));
    }

    #[test]
    fn test_payload_has_exactly_three_fields() {
        let payload = CompletionPayload {
            messages: vec![ChatMessage::user("hi")],
            model: "gpt-4o-mini".to_string(),
            stream: false,
        };
        let json = serde_json::to_value(&payload).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["messages", "model", "stream"]);
    }

    #[tokio::test]
    async fn test_complete_returns_body_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let upstream_body = r#"{"id": "cmpl-1", "choices": [{"message": {"role": "assistant", "content": "hello"}}]}"#;
        server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer llm-key")
            .with_body(upstream_body)
            .create_async()
            .await;

        let client = make_client(&server.url());
        let payload = CompletionPayload {
            messages: vec![ChatMessage::user("hi")],
            model: "gpt-4o-mini".to_string(),
            stream: false,
        };
        let body = client.complete(&payload).await.unwrap();
        assert_eq!(body, serde_json::from_str::<serde_json::Value>(upstream_body).unwrap());
    }

    #[tokio::test]
    async fn test_complete_relays_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "rate limited", "type": "rate_limit"}}"#)
            .create_async()
            .await;

        let client = make_client(&server.url());
        let payload = CompletionPayload {
            messages: vec![ChatMessage::user("hi")],
            model: "gpt-4o-mini".to_string(),
            stream: false,
        };
        let err = client.complete(&payload).await.unwrap_err();
        match err {
            Error::Upstream { status, detail, .. } => {
                assert_eq!(status, Some(429));
                assert!(detail.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_stream_forwards_chunks() {
        let mut server = mockito::Server::new_async().await;
        let sse = "data: {\"delta\": \"he\"}\n\ndata: {\"delta\": \"llo\"}\n\ndata: [DONE]\n\n";
        server
            .mock("POST", "/chat/completions")
            .with_header("content-type", "text/event-stream")
            .with_body(sse)
            .create_async()
            .await;

        let client = make_client(&server.url());
        let payload = CompletionPayload {
            messages: vec![ChatMessage::user("hi")],
            model: "gpt-4o-mini".to_string(),
            stream: true,
        };
        let stream = client.complete_stream(&payload).await.unwrap();
        let chunks: Vec<Bytes> = stream.map(|c| c.unwrap()).collect().await;
        let collected: Vec<u8> = chunks.concat();
        assert_eq!(collected, sse.as_bytes());
    }
}
