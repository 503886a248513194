//! CLI parse: clap types for lazyve. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lazyve - lazy structured variable elimination on demo models
#[derive(Debug, Parser)]
#[command(name = "lazyve")]
#[command(about = "Depth-bounded lazy variable elimination for recursive probabilistic models")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory searched for lazyve.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Solve a demo model once at a fixed depth
    Run {
        /// Demo model name (see `models`)
        model: String,
        /// Expansion depth
        #[arg(long, default_value = "3")]
        depth: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Solve a demo model with increasing depth, one row per cycle
    Anytime {
        /// Demo model name (see `models`)
        model: String,
        /// Depth increment per cycle (default from config)
        #[arg(long)]
        step: Option<usize>,
        /// Number of cycles
        #[arg(long, default_value = "5")]
        cycles: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List demo models
    Models,
    /// Print the effective configuration as TOML
    Config,
}
