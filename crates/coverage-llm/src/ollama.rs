//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API, so confidential
//! documents never leave the machine.
//!
//! # Features
//!
//! - Blocking HTTP communication with the Ollama API
//! - Fixed decoding parameters for repeatable extraction
//! - Model catalog listing and streamed model pulls
//! - Timeout handling (no retries)
//!
//! # Examples
//!
//! ```no_run
//! use coverage_llm::OllamaProvider;
//! use coverage_domain::ModelClient;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.2:3b").unwrap();
//! let text = provider.complete("Say 'hello' and nothing else").unwrap();
//! ```

use crate::config::{GenerationOptions, OllamaConfig};
use crate::LlmError;
use coverage_domain::{ModelCatalog, ModelClient};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::{debug, info};

/// Ollama API provider for local LLM inference
///
/// Uses a blocking client: call it from a thread that may block
/// (`tokio::task::spawn_blocking` inside an async runtime).
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    options: GenerationOptions,
    timeout: Duration,
    client: reqwest::blocking::Client,
    pull_client: reqwest::blocking::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerationOptions,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

/// Response from Ollama tags API
#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

/// Request body for Ollama pull API
#[derive(Serialize)]
struct OllamaPullRequest<'a> {
    name: &'a str,
    stream: bool,
}

/// One NDJSON line of a streamed pull
#[derive(Debug, Deserialize)]
pub(crate) struct PullProgress {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
}

impl OllamaProvider {
    /// Create a new Ollama provider with default settings
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.2:3b")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let config = OllamaConfig {
            endpoint: endpoint.into(),
            model: model.into(),
            ..OllamaConfig::default()
        };
        Self::from_config(&config)
    }

    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &OllamaConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Config)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        // A pull streams for as long as the download runs; only connecting is bounded
        let pull_client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .connect_timeout(config.pull_timeout())
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            options: config.options.clone(),
            timeout: config.timeout(),
            client,
            pull_client,
        })
    }

    /// Base URL of the Ollama API
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Decoding parameters sent with completions
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Map a transport failure to `Connection`
    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Connection(format!("Request to {} timed out: {}", self.endpoint, e))
        } else {
            LlmError::Connection(format!("Cannot reach Ollama at {}: {}", self.endpoint, e))
        }
    }

    /// Turn a non-success response into `Backend`
    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(LlmError::Backend {
            status: status.as_u16(),
            body,
        })
    }
}

impl ModelClient for OllamaProvider {
    type Error = LlmError;

    /// Generate text using Ollama API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running or the request times out (`Connection`)
    /// - Ollama answers with a non-success status (`Backend`)
    /// - The response body is not a generate response (`InvalidResponse`)
    fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: &self.options,
        };

        debug!("Sending {} char prompt to {}", prompt.len(), self.model);

        let response = self
            .client
            .post(self.url("/api/generate"))
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let response = Self::check_status(response)?;

        let parsed: OllamaGenerateResponse = response.json().map_err(|e| {
            if e.is_decode() {
                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
            } else {
                self.transport_error(e)
            }
        })?;

        Ok(parsed.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl ModelCatalog for OllamaProvider {
    type Error = LlmError;

    fn list_models(&self) -> Result<Vec<String>, Self::Error> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.timeout)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let response = Self::check_status(response)?;

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse model list: {}", e)))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    fn pull_model(&self, name: &str) -> Result<(), Self::Error> {
        info!("Pulling model {} from {}", name, self.endpoint);

        let response = self
            .pull_client
            .post(self.url("/api/pull"))
            .json(&OllamaPullRequest { name, stream: true })
            .send()
            .map_err(|e| self.transport_error(e))?;

        let response = Self::check_status(response)?;
        read_pull_stream(BufReader::new(response), name)
    }
}

/// Consume a pull progress stream until the terminal success event
pub(crate) fn read_pull_stream<R: BufRead>(reader: R, name: &str) -> Result<(), LlmError> {
    let mut last_status = String::new();

    for line in reader.lines() {
        let line = line.map_err(|e| {
            LlmError::Provisioning(format!("Pull stream for {} broke: {}", name, e))
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let event: PullProgress = serde_json::from_str(&line).map_err(|e| {
            LlmError::Provisioning(format!("Unreadable pull event for {}: {}", name, e))
        })?;

        if let Some(error) = event.error {
            return Err(LlmError::Provisioning(format!("Pull of {} failed: {}", name, error)));
        }

        let Some(status) = event.status else {
            continue;
        };

        if status == "success" {
            info!("Model {} pulled", name);
            return Ok(());
        }

        match (event.completed, event.total) {
            (Some(completed), Some(total)) if total > 0 => {
                debug!("{}: {} ({}/{} bytes)", name, status, completed, total);
            }
            _ => debug!("{}: {}", name, status),
        }
        if status != last_status {
            info!("Pull {}: {}", name, status);
            last_status = status;
        }
    }

    Err(LlmError::Provisioning(format!(
        "Pull stream for {} ended without success",
        name
    )))
}
