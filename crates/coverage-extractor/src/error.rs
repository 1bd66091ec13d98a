//! Error types for the Extractor

use coverage_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during extraction
///
/// Decoding problems are never errors; they show up as `DecodeQuality`.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Model backend unreachable
    #[error("Connection error: {0}")]
    Connection(String),

    /// Model backend answered with a non-success status
    #[error("Backend error: HTTP {status}: {body}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Model missing and could not be provisioned
    #[error("Provisioning error: {0}")]
    Provisioning(String),

    /// Any other LLM provider failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// A blocking extraction worker died
    #[error("Task error: {0}")]
    Task(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether the failure means the backend is unavailable
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ExtractorError::Connection(_))
    }
}

impl From<LlmError> for ExtractorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Connection(msg) => ExtractorError::Connection(msg),
            LlmError::Backend { status, body } => ExtractorError::Backend { status, body },
            LlmError::Provisioning(msg) => ExtractorError::Provisioning(msg),
            other => ExtractorError::Llm(other.to_string()),
        }
    }
}
