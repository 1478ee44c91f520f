//! Vector store client (Pinecone-compatible data plane)
//!
//! One long-lived handle, built at startup and shared for the life of the
//! process. Every operation round-trips to the external store; there is no
//! local caching.

use super::types::{
    DeleteRequest, NewRecord, QueryMatch, QueryRequest, QueryResponse, QueryResult,
    RecordMetadata, UpsertRequest, VectorRecord,
};
use crate::embedding::EmbeddingClient;
use crate::error::{Error, Result};
use uuid::Uuid;

/// Default number of matches returned by [`VectorStoreClient::query`]
pub const DEFAULT_QUERY_LIMIT: usize = 5;

/// Client for the external vector store
#[derive(Clone)]
pub struct VectorStoreClient {
    client: reqwest::Client,
    api_key: String,
    index_host: String,
    namespace: Option<String>,
    embedding: EmbeddingClient,
}

impl VectorStoreClient {
    /// Create a new vector store client bound to one index host
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        index_host: String,
        namespace: Option<String>,
        embedding: EmbeddingClient,
    ) -> Self {
        Self {
            client,
            api_key,
            index_host: index_host.trim_end_matches('/').to_string(),
            namespace,
            embedding,
        }
    }

    /// The embedding client used for store and query operations
    pub fn embedding(&self) -> &EmbeddingClient {
        &self.embedding
    }

    async fn post(&self, path: &str, body: &impl serde::Serialize) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.index_host, path);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let value = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);
        if !status.is_success() {
            return Err(Error::upstream(status.as_u16(), value));
        }
        Ok(value)
    }

    /// Store a record, assigning an ID and timestamp when absent.
    ///
    /// Returns the record ID.
    pub async fn store(&self, record: NewRecord) -> Result<String> {
        let id = record
            .id
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let timestamp = record
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

        let values = self.embedding.embed(&record.text).await?;

        let request = UpsertRequest {
            vectors: vec![VectorRecord {
                id: id.clone(),
                values,
                metadata: RecordMetadata {
                    text: record.text,
                    timestamp,
                },
            }],
            namespace: self.namespace.clone(),
        };
        self.post("/vectors/upsert", &request).await?;

        tracing::info!(id = %id, "Record stored");
        Ok(id)
    }

    /// Query up to `limit` nearest records for the given text
    pub async fn query(&self, text: &str, limit: usize) -> Result<Vec<QueryResult>> {
        let vector = self.embedding.embed(text).await?;

        let request = QueryRequest {
            vector,
            top_k: limit,
            include_metadata: true,
            namespace: self.namespace.clone(),
        };
        let value = self.post("/query", &request).await?;
        let response: QueryResponse = serde_json::from_value(value)?;

        let results = response
            .matches
            .into_iter()
            .filter_map(map_match)
            .collect::<Vec<_>>();
        tracing::debug!(count = results.len(), "Vector query complete");
        Ok(results)
    }

    /// Delete one record by ID; absent IDs succeed (delegated to the store)
    pub async fn delete(&self, id: &str) -> Result<()> {
        let request = DeleteRequest {
            ids: Some(vec![id.to_string()]),
            delete_all: None,
            namespace: self.namespace.clone(),
        };
        self.post("/vectors/delete", &request).await?;
        tracing::info!(id = %id, "Record deleted");
        Ok(())
    }

    /// Remove every record in the store. Irreversible; maintenance and
    /// testing only.
    pub async fn clear_all(&self) -> Result<()> {
        let request = DeleteRequest {
            ids: None,
            delete_all: Some(true),
            namespace: self.namespace.clone(),
        };
        self.post("/vectors/delete", &request).await?;
        tracing::info!("All records cleared");
        Ok(())
    }
}

fn map_match(m: QueryMatch) -> Option<QueryResult> {
    // Matches without metadata cannot be rendered as records
    let metadata = m.metadata?;
    Some(QueryResult {
        id: m.id,
        text: metadata.text,
        timestamp: metadata.timestamp,
        similarity: m.score,
    })
}
