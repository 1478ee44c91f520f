//! RagRelay configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main RagRelay configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagRelayConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// LLM API configuration (completions and embeddings)
    pub llm: LlmConfig,

    /// Vector store configuration
    pub vector_store: VectorStoreConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = allow any)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

/// LLM API configuration
///
/// Covers both the chat-completion endpoint and the embedding endpoint,
/// which share a base URL and API key (OpenAI-style API surface).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the LLM API
    pub api_url: String,

    /// Environment variable holding the LLM API key
    pub api_key_ref: String,

    /// Default chat model when the request does not name one
    pub model: String,

    /// Fixed embedding model identifier
    pub embedding_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key_ref: "LLM_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Vector store configuration (Pinecone-compatible data plane)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Environment variable holding the vector store API key
    pub api_key_ref: String,

    /// Environment variable holding the index host URL
    pub index_host_ref: String,

    /// Literal index host URL; takes precedence over `index_host_ref`
    #[serde(default)]
    pub index_host: Option<String>,

    /// Optional namespace applied to every store operation
    #[serde(default)]
    pub namespace: Option<String>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            api_key_ref: "PINECONE_API_KEY".to_string(),
            index_host_ref: "PINECONE_INDEX_HOST".to_string(),
            index_host: None,
            namespace: None,
        }
    }
}

/// Credentials resolved from the environment at startup
#[derive(Debug, Clone, Default)]
pub struct ResolvedCredentials {
    /// LLM API key; empty when the referenced variable is unset
    pub llm_api_key: String,

    /// Vector store API key
    pub vector_api_key: Option<String>,

    /// Vector store index host URL
    pub vector_index_host: Option<String>,
}

/// Resolve a `*_ref` environment reference, trying the exact name and then
/// the UPPER_CASE form.
fn resolve_env_ref(name: &str) -> Option<String> {
    std::env::var(name)
        .or_else(|_| std::env::var(name.to_uppercase()))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

impl RagRelayConfig {
    /// Load configuration from an optional TOML file, falling back to defaults.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Failed to parse {}: {}", p.display(), e)))?
            }
            None => RagRelayConfig::default(),
        };

        // PORT overrides the configured server port
        if let Some(port) = resolve_env_ref("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT value: {}", port)))?;
        }

        Ok(config)
    }

    /// Resolve API keys and the index host from the environment.
    pub fn resolve_credentials(&self) -> ResolvedCredentials {
        ResolvedCredentials {
            llm_api_key: resolve_env_ref(&self.llm.api_key_ref).unwrap_or_default(),
            vector_api_key: resolve_env_ref(&self.vector_store.api_key_ref),
            vector_index_host: self
                .vector_store
                .index_host
                .clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| resolve_env_ref(&self.vector_store.index_host_ref)),
        }
    }
}

impl ResolvedCredentials {
    /// Fail fast when the vector store cannot be reached at all.
    ///
    /// The LLM key is deliberately not checked here: the completion route
    /// reports a missing key per request, and callers depend on which
    /// precondition error surfaces first.
    pub fn require_vector_store(&self, config: &VectorStoreConfig) -> Result<(String, String)> {
        let api_key = self.vector_api_key.clone().ok_or_else(|| {
            Error::Config(format!(
                "{} environment variable is required",
                config.api_key_ref
            ))
        })?;
        let index_host = self.vector_index_host.clone().ok_or_else(|| {
            Error::Config(format!(
                "{} environment variable is required",
                config.index_host_ref
            ))
        })?;
        Ok((api_key, index_host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RagRelayConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.embedding_model, "text-embedding-3-small");
        assert_eq!(config.vector_store.api_key_ref, "PINECONE_API_KEY");
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = RagRelayConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: RagRelayConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.server.host, config.server.host);
        assert_eq!(parsed.llm.api_url, config.llm.api_url);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 8088

[llm]
api_url = "https://llm.internal/v1"
api_key_ref = "LLM_API_KEY"
model = "gpt-4o"
embedding_model = "text-embedding-3-small"

[vector_store]
api_key_ref = "PINECONE_API_KEY"
index_host_ref = "PINECONE_INDEX_HOST"
index_host = "https://idx-test.svc.pinecone.io"
"#
        )
        .unwrap();

        let config = RagRelayConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(
            config.vector_store.index_host.as_deref(),
            Some("https://idx-test.svc.pinecone.io")
        );
    }

    #[test]
    fn test_literal_index_host_wins_over_env_ref() {
        let config = VectorStoreConfig {
            index_host: Some("https://literal.example".to_string()),
            // Points at a variable that is never set in the test environment
            index_host_ref: "RAGRELAY_TEST_UNSET_HOST".to_string(),
            ..Default::default()
        };
        let full = RagRelayConfig {
            vector_store: config,
            ..Default::default()
        };
        let creds = full.resolve_credentials();
        assert_eq!(
            creds.vector_index_host.as_deref(),
            Some("https://literal.example")
        );
    }

    #[test]
    fn test_require_vector_store_missing() {
        let config = VectorStoreConfig {
            api_key_ref: "RAGRELAY_TEST_UNSET_KEY".to_string(),
            index_host_ref: "RAGRELAY_TEST_UNSET_HOST".to_string(),
            ..Default::default()
        };
        let creds = ResolvedCredentials::default();
        let err = creds.require_vector_store(&config).unwrap_err();
        assert!(err
            .to_string()
            .contains("RAGRELAY_TEST_UNSET_KEY environment variable is required"));
    }
}
