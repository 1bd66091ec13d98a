//! Model availability check, run once at startup
//!
//! Check-then-pull is not safe against two processes provisioning the same
//! model concurrently; one initialization per process is assumed.

use crate::LlmError;
use coverage_domain::ModelCatalog;
use tracing::info;

/// Make sure `model` is served by the backend, pulling it if absent
///
/// # Errors
///
/// - `Connection` if the catalog cannot be reached
/// - `Backend` if the catalog request is refused
/// - `Provisioning` if the pull does not end in success
pub fn ensure_model<C>(catalog: &C, model: &str) -> Result<(), LlmError>
where
    C: ModelCatalog<Error = LlmError> + ?Sized,
{
    let available = catalog.list_models()?;

    if is_model_listed(&available, model) {
        info!("Model {} is available", model);
        return Ok(());
    }

    info!(
        "Model {} not found among {} installed models, provisioning",
        model,
        available.len()
    );
    catalog.pull_model(model)
}

/// Whether `model` appears in the catalog
///
/// Ollama lists untagged models with an explicit `:latest` tag, so an
/// untagged request also matches `<name>:latest`.
pub fn is_model_listed(available: &[String], model: &str) -> bool {
    available.iter().any(|name| {
        name == model || (!model.contains(':') && *name == format!("{}:latest", model))
    })
}
