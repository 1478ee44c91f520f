//! Embedding client
//!
//! Wraps the OpenAI-style `/embeddings` endpoint: text in, vector out.
//! One call per request, no retry; failures surface as [`Error::Upstream`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Client for the external embedding API
#[derive(Clone)]
pub struct EmbeddingClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    /// Create a new embedding client with a fixed model identifier
    pub fn new(client: reqwest::Client, api_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
            model,
        }
    }

    /// Generate an embedding vector for the given text.
    ///
    /// Returns the first embedding from the response.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.api_url.trim_end_matches('/'));
        tracing::debug!(model = %self.model, text_len = text.len(), "Generating embedding");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
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

        let parsed: EmbeddingResponse = response.json().await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Upstream {
                status: Some(status.as_u16()),
                message: "Embedding response contained no data".to_string(),
                detail: None,
            })
    }
}
