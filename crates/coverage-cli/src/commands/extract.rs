//! Extract command implementation.

use crate::cli::{ExtractArgs, OnlyArg};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use coverage_domain::ModelClient;
use coverage_extractor::{Extractor, ExtractorError};
use coverage_llm::{ensure_model, OllamaProvider};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = read_input(args.file.as_deref())?;

    if text.trim().is_empty() {
        return Err(CliError::InvalidInput(
            "No text provided for extraction".to_string(),
        ));
    }

    let provider = OllamaProvider::from_config(&config.ollama)?;

    if args.skip_ensure {
        debug!("Skipping model check for {}", config.ollama.model);
    } else {
        ensure_model(&provider, &config.ollama.model)?;
    }

    let extractor = Extractor::new(provider, config.extractor.clone())?;
    let output = run_extraction(&extractor, &text, args.only, formatter)?;

    println!("{}", output);

    Ok(())
}

/// Run the requested extraction and render it
///
/// A single pipeline runs on the calling thread; the full extraction runs
/// both pipelines on a short-lived runtime.
pub fn run_extraction<L>(
    extractor: &Extractor<L>,
    text: &str,
    only: Option<OnlyArg>,
    formatter: &Formatter,
) -> Result<String>
where
    L: ModelClient + Send + Sync + 'static,
    L::Error: Into<ExtractorError>,
{
    match only {
        Some(OnlyArg::Fields) => formatter.format_fields(&extractor.extract_fields(text)?),
        Some(OnlyArg::Procedures) => {
            formatter.format_procedures(&extractor.extract_procedures(text)?)
        }
        None => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(extractor.run(text))?;
            formatter.format_result(&result)
        }
    }
}

/// Read the source text from a file, or stdin when no file is given
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
