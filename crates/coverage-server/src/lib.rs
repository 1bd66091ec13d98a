//! Coverage Server
//!
//! HTTP front end for dental plan extraction.
//! Accepts plan text and returns the field record and procedure list.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use coverage_domain::ModelClient;
use coverage_extractor::{Extractor, ExtractorError};
use coverage_llm::{ensure_model, LlmError, OllamaProvider};
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Model backend could not be prepared
    #[error("Model backend error: {0}")]
    Llm(#[from] LlmError),

    /// Extractor could not be built
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the Ollama-backed extractor, provisioning the model if needed
///
/// Blocks on backend calls; run it before entering an async runtime.
pub fn build_extractor(config: &ServerConfig) -> Result<Extractor<OllamaProvider>, ServerError> {
    let provider = OllamaProvider::from_config(&config.ollama)?;

    info!("Checking model {} at {}", config.ollama.model, provider.endpoint());
    ensure_model(&provider, &config.ollama.model)?;

    Ok(Extractor::new(provider, config.extractor.clone())?)
}

/// Start the extraction HTTP server
///
/// Binds to the configured address and serves until the process exits.
pub async fn start_server<L>(config: &ServerConfig, extractor: Extractor<L>) -> Result<(), ServerError>
where
    L: ModelClient + Send + Sync + 'static,
    L::Error: Into<ExtractorError>,
{
    info!("Starting coverage server");
    info!("Bind address: {}", config.bind_addr());
    info!("Model: {}", extractor.model_name());
    info!("Fields: {}", extractor.schema().len());

    let state = AppState {
        extractor: Arc::new(extractor),
    };

    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
