//! Coverage LLM Provider Layer
//!
//! Generative model backends for coverage extraction.
//!
//! # Architecture
//!
//! This crate implements the `ModelClient` and `ModelCatalog` traits from
//! `coverage-domain`. Completions are synchronous: one request, one response,
//! no retries.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use coverage_llm::MockProvider;
//! use coverage_domain::ModelClient;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.complete("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod availability;
pub mod config;
pub mod ollama;

use coverage_domain::{ModelCatalog, ModelClient};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use availability::ensure_model;
pub use config::{GenerationOptions, OllamaConfig};
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Backend unreachable: connection refused, DNS failure or timeout
    #[error("Connection error: {0}")]
    Connection(String),

    /// Backend answered with a non-success status
    #[error("Backend error: HTTP {status}: {body}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the backend
        body: String,
    },

    /// Model missing and could not be provisioned
    #[error("Provisioning error: {0}")]
    Provisioning(String),

    /// Backend answered with a body we could not decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Canned outcome for prompts matching a needle
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Delayed(String, Duration),
    Fail(LlmError),
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Responses are keyed by a substring of the prompt; the first needle
/// contained in a prompt decides the reply.
///
/// # Examples
///
/// ```
/// use coverage_llm::MockProvider;
/// use coverage_domain::ModelClient;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.complete("any prompt").unwrap(), "Fixed response");
///
/// // Responses chosen by prompt content
/// let mut provider = MockProvider::default();
/// provider.add_response("FIELDS TO EXTRACT", "{}");
/// provider.add_response("procedure code", "[]");
/// assert_eq!(provider.complete("... FIELDS TO EXTRACT ...").unwrap(), "{}");
/// assert_eq!(provider.complete("... procedure code ...").unwrap(), "[]");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    default_response: String,
    replies: Arc<Mutex<Vec<(String, MockReply)>>>,
    call_count: Arc<Mutex<usize>>,
    latency: Option<Duration>,
    models: Arc<Mutex<Vec<String>>>,
    pull_error: Option<LlmError>,
    pulled: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock".to_string(),
            default_response: response.into(),
            replies: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            latency: None,
            models: Arc::new(Mutex::new(vec!["mock".to_string()])),
            pull_error: None,
            pulled: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` to any prompt containing `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.replies).push((needle.into(), MockReply::Text(response.into())));
    }

    /// Reply with `response` after `delay` to any prompt containing `needle`
    pub fn add_delayed_response(
        &mut self,
        needle: impl Into<String>,
        response: impl Into<String>,
        delay: Duration,
    ) {
        lock(&self.replies).push((needle.into(), MockReply::Delayed(response.into(), delay)));
    }

    /// Fail with `error` for any prompt containing `needle`
    pub fn add_error(&mut self, needle: impl Into<String>, error: LlmError) {
        lock(&self.replies).push((needle.into(), MockReply::Fail(error)));
    }

    /// Sleep this long before answering each completion
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replace the model catalog
    pub fn with_models<I, S>(self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *lock(&self.models) = models.into_iter().map(Into::into).collect();
        self
    }

    /// Make every pull fail with `error`
    pub fn with_pull_error(mut self, error: LlmError) -> Self {
        self.pull_error = Some(error);
        self
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// Models pulled so far, in order
    pub fn pulled(&self) -> Vec<String> {
        lock(&self.pulled).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl ModelClient for MockProvider {
    type Error = LlmError;

    fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let reply = lock(&self.replies)
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Delayed(text, delay)) => {
                std::thread::sleep(delay);
                Ok(text)
            }
            Some(MockReply::Fail(error)) => Err(error),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl ModelCatalog for MockProvider {
    type Error = LlmError;

    fn list_models(&self) -> Result<Vec<String>, Self::Error> {
        Ok(lock(&self.models).clone())
    }

    fn pull_model(&self, name: &str) -> Result<(), Self::Error> {
        if let Some(error) = &self.pull_error {
            return Err(error.clone());
        }
        lock(&self.pulled).push(name.to_string());
        lock(&self.models).push(name.to_string());
        Ok(())
    }
}
