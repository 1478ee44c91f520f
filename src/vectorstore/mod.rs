//! Vector store integration
//!
//! A thin client over a Pinecone-compatible data plane: upsert, top-K
//! nearest-neighbor query, delete, and clear. Embeddings are generated
//! through [`crate::embedding::EmbeddingClient`] before every store or
//! query operation.

mod client;
mod types;

pub use client::{VectorStoreClient, DEFAULT_QUERY_LIMIT};
pub use types::{NewRecord, QueryResult, RecordMetadata};
