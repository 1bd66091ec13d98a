//! Coverage CLI - Command-line front end for dental plan extraction.

use clap::Parser;
use coverage_cli::cli::CliFormat;
use coverage_cli::commands;
use coverage_cli::config::OutputFormat;
use coverage_cli::{Cli, Command, Config, Formatter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> coverage_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Command::Init(args) => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::path()?,
            };
            let formatter = Formatter::new(OutputFormat::Json, !cli.no_color);
            commands::execute_init(args, &path, &formatter)?;
        }
        Command::Extract(args) => {
            let (config, formatter) = load(cli.config, cli.format, cli.no_color)?;
            commands::execute_extract(args, &config, &formatter)?;
        }
        Command::Check => {
            let (config, formatter) = load(cli.config, cli.format, cli.no_color)?;
            commands::execute_check(&config, &formatter)?;
        }
    }

    Ok(())
}

/// Load config and build the formatter, command-line flags taking precedence
fn load(
    path: Option<PathBuf>,
    format: Option<CliFormat>,
    no_color: bool,
) -> coverage_cli::Result<(Config, Formatter)> {
    let config = match path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    let format = format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);
    Ok((config, formatter))
}
