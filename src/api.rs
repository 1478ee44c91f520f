//! Unified API router for RagRelay
//!
//! Maps the REST surface onto the completion proxy and the vector store
//! client, with CORS and a shared application state.
//!
//! ## Endpoint Map
//!
//! | Route                          | Description                                |
//! |--------------------------------|--------------------------------------------|
//! | `GET  /`                       | Static landing page                        |
//! | `GET  /health`                 | Load balancer health probe                 |
//! | `POST /chat/completions`       | Proxied LLM completion (buffered/streamed) |
//! | `POST /rag/pinecone/store`     | Store a record                             |
//! | `POST /rag/pinecone/query`     | Top-K nearest-neighbor query               |
//! | `DELETE /rag/pinecone/:id`     | Delete one record                          |
//! | `DELETE /rag/pinecone/clear/all` | Clear every record                       |
//! | `POST /rag/pinecone/embed`     | Generate an embedding (utility)            |

use crate::completion::{ChatRequest, CompletionClient, CompletionPayload};
use crate::context;
use crate::error::Error;
use crate::vectorstore::{NewRecord, VectorStoreClient, DEFAULT_QUERY_LIMIT};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Combined application state holding the outbound client handles.
///
/// Both clients are built once at startup and shared across requests; there
/// is no other in-process state.
#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<CompletionClient>,
    pub store: Arc<VectorStoreClient>,
}

/// Build the complete RagRelay HTTP application
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health_check))
        .route("/chat/completions", post(chat_completions))
        .route("/rag/pinecone/store", post(store_record))
        .route("/rag/pinecone/query", post(query_records))
        .route("/rag/pinecone/clear/all", delete(clear_all_records))
        .route("/rag/pinecone/:id", delete(delete_record))
        .route("/rag/pinecone/embed", post(embed_text))
        .with_state(state)
        .layer(cors)
}

// =============================================================================
// Root handlers
// =============================================================================

async fn landing_page() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Chat completion proxy
// =============================================================================

async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let chat = match request.into_validated(state.completion.api_key()) {
        Ok(chat) => chat,
        Err(err) => return error_response(&err).into_response(),
    };
    let mut messages = chat.messages;

    if chat.query_rag {
        // A failed retrieval degrades to an unaugmented prompt; it never
        // aborts the completion request.
        match context::augment(&state.store, &mut messages).await {
            Ok(()) => tracing::info!("Added context to messages"),
            Err(err) => {
                tracing::warn!(error = %err, "Error retrieving records, proceeding without context")
            }
        }
    }

    let payload = CompletionPayload {
        messages,
        model: chat
            .model
            .unwrap_or_else(|| state.completion.default_model().to_string()),
        stream: chat.stream,
    };

    if chat.stream {
        match state.completion.complete_stream(&payload).await {
            Ok(stream) => (
                [
                    (header::CONTENT_TYPE, "text/event-stream"),
                    (header::CACHE_CONTROL, "no-cache"),
                    (header::CONNECTION, "keep-alive"),
                ],
                Body::from_stream(stream),
            )
                .into_response(),
            Err(err) => completion_error_response(&err).into_response(),
        }
    } else {
        match state.completion.complete(&payload).await {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(err) => completion_error_response(&err).into_response(),
        }
    }
}

// =============================================================================
// Vector store endpoints
// =============================================================================

#[derive(Debug, Deserialize)]
struct StoreBody {
    text: Option<String>,
    id: Option<String>,
    timestamp: Option<i64>,
}

/// POST /rag/pinecone/store
async fn store_record(State(state): State<AppState>, Json(body): Json<StoreBody>) -> Response {
    let text = match body.text.filter(|t| !t.trim().is_empty()) {
        Some(text) => text,
        None => {
            return error_response(&Error::Validation("Missing required fields".to_string()))
                .into_response()
        }
    };

    let record = NewRecord {
        text,
        id: body.id,
        timestamp: body.timestamp,
    };
    match state.store.store(record).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"success": true, "id": id})),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Error in store endpoint");
            error_response(&err).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    query: Option<String>,
    options: Option<QueryOptions>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryOptions {
    limit: Option<usize>,
}

/// POST /rag/pinecone/query
async fn query_records(State(state): State<AppState>, Json(body): Json<QueryBody>) -> Response {
    let query = match body.query.filter(|q| !q.trim().is_empty()) {
        Some(query) => query,
        None => {
            return error_response(&Error::Validation("Query is required".to_string()))
                .into_response()
        }
    };

    let limit = body
        .options
        .unwrap_or_default()
        .limit
        .unwrap_or(DEFAULT_QUERY_LIMIT);
    match state.store.query(&query, limit).await {
        Ok(results) => Json(results).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Error in query endpoint");
            error_response(&err).into_response()
        }
    }
}

/// DELETE /rag/pinecone/:id
async fn delete_record(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete(&id).await {
        Ok(()) => Json(serde_json::json!({
            "success": true,
            "message": format!("Record {} deleted successfully", id)
        }))
        .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Error in delete endpoint");
            error_response(&err).into_response()
        }
    }
}

/// DELETE /rag/pinecone/clear/all
async fn clear_all_records(State(state): State<AppState>) -> Response {
    match state.store.clear_all().await {
        Ok(()) => Json(serde_json::json!({
            "success": true,
            "message": "All records cleared successfully"
        }))
        .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Error in clear all endpoint");
            error_response(&err).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmbedBody {
    text: Option<String>,
}

/// POST /rag/pinecone/embed
async fn embed_text(State(state): State<AppState>, Json(body): Json<EmbedBody>) -> Response {
    let text = match body.text.filter(|t| !t.trim().is_empty()) {
        Some(text) => text,
        None => {
            return error_response(&Error::Validation("Text is required".to_string()))
                .into_response()
        }
    };

    match state.store.embedding().embed(&text).await {
        Ok(embedding) => Json(serde_json::json!({"embedding": embedding})).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Error in embed endpoint");
            error_response(&err).into_response()
        }
    }
}

// =============================================================================
// Error translation
// =============================================================================

/// Translate a component failure into an HTTP response
fn error_response(err: &Error) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        Error::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": message})),
        ),
        Error::Upstream {
            status,
            message,
            detail,
        } => {
            let code = status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let payload = detail
                .clone()
                .unwrap_or_else(|| serde_json::Value::String(message.clone()));
            (code, Json(serde_json::json!({"error": payload})))
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": other.to_string()})),
        ),
    }
}

/// Chat-route error translation, matching the proxy's wire contract:
/// network failures and upstream errors without a payload get the fixed
/// LLM proxy messages.
fn completion_error_response(err: &Error) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        Error::Http(source) => {
            tracing::error!(error = %source, "LLM proxy error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "No response received from LLM API"})),
            )
        }
        Error::Upstream { status, detail, .. } => {
            let code = status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let payload = detail
                .clone()
                .unwrap_or_else(|| serde_json::Value::String("Error from LLM API".to_string()));
            (code, Json(serde_json::json!({"error": payload})))
        }
        other => error_response(other),
    }
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}
