//! lazyve CLI Binary
//!
//! Runs the demo models one-shot or iteratively from the command line.

use anyhow::Context;
use clap::Parser;
use lazyve::cli::{Cli, RunContext};
use lazyve::config::ConfigLoader;
use lazyve::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&cli) {
        error!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())
        .map_err(|e| anyhow::anyhow!(lazyve::cli::map_error(&e)))
        .context("Failed to load configuration")?;
    info!("CLI context initialized");

    let output = context
        .execute(&cli.command)
        .map_err(|e| anyhow::anyhow!(lazyve::cli::map_error(&e)))?;
    println!("{}", output);
    Ok(())
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path).ok(),
        None => ConfigLoader::load(&cli.workspace).ok(),
    }
    .map(|c| c.logging)
    .unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    config
}
