//! RagRelay - RAG-augmented chat completion proxy
//!
//! RagRelay sits between an application and an LLM completion API. It
//! forwards chat conversations upstream (buffered or streamed) and can
//! augment them with context retrieved from an external vector store
//! (retrieval-augmented generation).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     HTTP Front Door                       │
//! │   GET /   POST /chat/completions   /rag/pinecone/*        │
//! └───────────────┬──────────────────────────┬───────────────┘
//!                 │                          │
//!     ┌───────────▼───────────┐   ┌──────────▼──────────────┐
//!     │   Completion Proxy    │   │   Vector Store Client    │
//!     │  - precondition checks│   │  - upsert / query        │
//!     │  - buffered & SSE     │   │  - delete / clear        │
//!     └───────────┬───────────┘   └──────────┬──────────────┘
//!                 │                          │
//!     ┌───────────▼───────────┐   ┌──────────▼──────────────┐
//!     │  Context Assembler    │◄──┤    Embedding Client      │
//!     │  - top-K retrieval    │   │    text → vector         │
//!     │  - system message     │   └─────────────────────────┘
//!     └───────────────────────┘
//! ```
//!
//! All durable state lives in the external vector store; the process holds
//! only client handles, built once at startup.
//!
//! ## Modules
//!
//! - [`api`]: HTTP router and handlers
//! - [`completion`]: chat types and the upstream LLM client
//! - [`context`]: RAG context assembly
//! - [`embedding`]: embedding generation client
//! - [`vectorstore`]: vector store client and data types
//! - [`config`]: configuration management
//! - [`server`]: server lifecycle

pub mod api;
pub mod completion;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod server;
pub mod vectorstore;

pub use config::RagRelayConfig;
pub use error::{Error, Result};
