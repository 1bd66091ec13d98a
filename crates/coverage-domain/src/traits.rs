//! Trait definitions for external interactions
//!
//! These traits define the boundary between extraction logic and the
//! generative model backend. Implementations live in `coverage-llm`.

/// Trait for text completion against a generative model
///
/// Implemented by the infrastructure layer (coverage-llm)
pub trait ModelClient {
    /// Error type for completion requests
    type Error;

    /// Complete a prompt, blocking until the backend answers
    ///
    /// One request, one response. Retries are the caller's decision.
    fn complete(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the model answering completions
    fn model_name(&self) -> &str;
}

/// Trait for inspecting and provisioning the backend's models
///
/// Implemented by the infrastructure layer (coverage-llm)
pub trait ModelCatalog {
    /// Error type for catalog operations
    type Error;

    /// Identifiers of the models the backend can serve
    fn list_models(&self) -> Result<Vec<String>, Self::Error>;

    /// Provision a model, blocking until the backend reports success
    fn pull_model(&self, name: &str) -> Result<(), Self::Error>;
}
