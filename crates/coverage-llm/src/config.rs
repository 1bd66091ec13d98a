//! Configuration for the Ollama backend

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Default timeout for completions; generous to survive cold model loads
pub const DEFAULT_TIMEOUT_SECS: u64 = 1000;

/// Default connect timeout for a model pull; the download itself is unbounded
pub const DEFAULT_PULL_TIMEOUT_SECS: u64 = 300;

/// Decoding parameters sent with every completion
///
/// Low temperature and a narrow nucleus keep extraction output repeatable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling threshold
    pub top_p: f32,

    /// Maximum tokens in the completion
    pub num_predict: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.9,
            num_predict: 1000,
        }
    }
}

/// Connection settings for an Ollama instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model used for completions
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Model pull connect timeout (seconds)
    #[serde(default = "default_pull_timeout_secs")]
    pub pull_timeout_secs: u64,

    /// Decoding parameters
    #[serde(default)]
    pub options: GenerationOptions,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_pull_timeout_secs() -> u64 {
    DEFAULT_PULL_TIMEOUT_SECS
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            pull_timeout_secs: DEFAULT_PULL_TIMEOUT_SECS,
            options: GenerationOptions::default(),
        }
    }
}

impl OllamaConfig {
    /// Completion timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pull connect timeout as a Duration
    pub fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.pull_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint cannot be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.pull_timeout_secs == 0 {
            return Err("pull_timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.options.temperature) {
            return Err(format!(
                "temperature {} out of range [0.0, 2.0]",
                self.options.temperature
            ));
        }
        if !(0.0..=1.0).contains(&self.options.top_p) {
            return Err(format!("top_p {} out of range [0.0, 1.0]", self.options.top_p));
        }
        Ok(())
    }
}
