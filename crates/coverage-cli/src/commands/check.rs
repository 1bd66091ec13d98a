//! Check command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use coverage_llm::{ensure_model, OllamaProvider};

/// Execute the check command.
///
/// Lists the backend's models and pulls the configured one if it is missing.
pub fn execute_check(config: &Config, formatter: &Formatter) -> Result<()> {
    let provider = OllamaProvider::from_config(&config.ollama)?;

    println!(
        "{}",
        formatter.info(&format!(
            "Checking model {} at {}",
            config.ollama.model,
            provider.endpoint()
        ))
    );

    ensure_model(&provider, &config.ollama.model)?;

    println!(
        "{}",
        formatter.success(&format!("Model {} is ready", config.ollama.model))
    );

    Ok(())
}
