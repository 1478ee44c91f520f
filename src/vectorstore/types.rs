//! Vector store data types

use serde::{Deserialize, Deserializer, Serialize};

/// A record to be stored.
///
/// `id` and `timestamp` are assigned at store time when absent.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub text: String,
    pub id: Option<String>,
    pub timestamp: Option<i64>,
}

/// A nearest-neighbor match produced per query; never persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub id: String,
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Store-reported similarity score, unfiltered
    pub similarity: f32,
}

/// Metadata attached to every stored vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub text: String,
    #[serde(deserialize_with = "timestamp_compat")]
    pub timestamp: i64,
}

/// Accept both numeric and stringified timestamps.
///
/// Older writers stored `timestamp.toString()`; the store also reports
/// numeric metadata as floats.
fn timestamp_compat<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => Ok(v),
        Raw::Float(v) => Ok(v as i64),
        Raw::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid timestamp: {s:?}"))),
    }
}

// =============================================================================
// Pinecone data-plane wire types
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct UpsertRequest {
    pub vectors: Vec<VectorRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<RecordMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}
