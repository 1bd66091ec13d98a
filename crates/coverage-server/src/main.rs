//! Coverage Server CLI
//!
//! Starts the extraction HTTP server.

use coverage_server::{build_extractor, config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize tracing (log to stderr)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ServerError> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("No config file specified, using defaults");
        ServerConfig::default()
    };

    // The Ollama client blocks, so provision before the runtime starts
    let extractor = build_extractor(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(start_server(&config, extractor))
}

fn print_help() {
    println!("Coverage Server - Dental plan extraction over HTTP");
    println!();
    println!("USAGE:");
    println!("    coverage-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENDPOINTS:");
    println!("    POST /extract      {{\"text\": \"...\"}} -> insurance_data, procedures");
    println!("    GET  /health       Liveness and model name");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address: IP address to bind (default '0.0.0.0')");
    println!("    - bind_port: Port number (default 5000)");
    println!("    - [ollama]: endpoint, model, timeout_secs, pull_timeout_secs, options");
    println!("    - [extractor]: max_text_length, fields");
    println!();
    println!("    Set RUST_LOG to change log verbosity (default 'info').");
}
