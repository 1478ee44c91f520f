//! RagRelay - RAG-augmented chat completion proxy
//!
//! Proxies chat-completion requests to an LLM API, optionally augmenting
//! them with context retrieved from an external vector store.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ragrelay::{
    api::AppState,
    completion::CompletionClient,
    config::RagRelayConfig,
    embedding::EmbeddingClient,
    server,
    vectorstore::VectorStoreClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ragrelay")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "RAG-augmented chat completion proxy")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RAGRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file and PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check configuration and credentials
    Doctor,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ragrelay={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagRelayConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            run_serve(config, host, port).await?;
        }
        Commands::Doctor => {
            run_doctor(&config);
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_serve(
    mut config: RagRelayConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let credentials = config.resolve_credentials();

    // The vector store is required up front: one long-lived client handle
    // for the life of the process.
    let (vector_api_key, index_host) = credentials.require_vector_store(&config.vector_store)?;

    // The LLM key is only checked per request, so the completion route can
    // report it in its fixed precondition order.
    if credentials.llm_api_key.is_empty() {
        tracing::warn!(
            "{} is not set; completion requests will be rejected",
            config.llm.api_key_ref
        );
    }

    let http = reqwest::Client::new();
    let embedding = EmbeddingClient::new(
        http.clone(),
        config.llm.api_url.clone(),
        credentials.llm_api_key.clone(),
        config.llm.embedding_model.clone(),
    );
    let store = VectorStoreClient::new(
        http.clone(),
        vector_api_key,
        index_host,
        config.vector_store.namespace.clone(),
        embedding,
    );
    let completion = CompletionClient::new(
        http,
        config.llm.api_url.clone(),
        credentials.llm_api_key.clone(),
        config.llm.model.clone(),
    );

    let state = AppState {
        completion: Arc::new(completion),
        store: Arc::new(store),
    };

    server::run(&config, state).await?;
    Ok(())
}

fn run_doctor(config: &RagRelayConfig) {
    println!("🔍 RagRelay Doctor");
    println!();

    println!("Checking credentials...");
    let credentials = config.resolve_credentials();
    if credentials.llm_api_key.is_empty() {
        println!("  ✗ {} not set (completions will be rejected)", config.llm.api_key_ref);
    } else {
        println!("  ✓ {} set", config.llm.api_key_ref);
    }
    match &credentials.vector_api_key {
        Some(_) => println!("  ✓ {} set", config.vector_store.api_key_ref),
        None => println!("  ✗ {} not set", config.vector_store.api_key_ref),
    }
    match &credentials.vector_index_host {
        Some(host) => println!("  ✓ index host: {}", host),
        None => println!("  ✗ {} not set", config.vector_store.index_host_ref),
    }

    println!();
    println!("Upstream endpoints...");
    println!("  LLM API: {}", config.llm.api_url);
    println!("  chat model: {}", config.llm.model);
    println!("  embedding model: {}", config.llm.embedding_model);

    println!();
    println!("Doctor check complete!");
}

fn show_config(config: Option<&RagRelayConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
