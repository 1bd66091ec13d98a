//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coverage CLI - Extract dental plan data from free-form text.
#[derive(Debug, Parser)]
#[command(name = "coverage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COVERAGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Tables
    Table,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract plan fields and procedures from text
    Extract(ExtractArgs),

    /// Check the model backend, pulling the model if it is missing
    Check,

    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Read text from a file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Run only one of the two extractions
    #[arg(long, value_enum)]
    pub only: Option<OnlyArg>,

    /// Do not check or pull the model before extracting
    #[arg(long)]
    pub skip_ensure: bool,
}

/// Which extraction to run alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OnlyArg {
    /// Field record only
    Fields,
    /// Procedure list only
    Procedures,
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Table => crate::config::OutputFormat::Table,
        }
    }
}
