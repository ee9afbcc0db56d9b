// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `lakebench`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lakebench",
    version,
    about = "Run a workload DAG against a table backend and validate its commit timeline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workload specification (TOML).
    ///
    /// Default: `Lakebench.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Lakebench.toml")]
    pub workload: String,

    /// Use a built-in programmatic DAG generator instead of a workload file.
    ///
    /// Known variants: `insert-upsert-validate`, `wide-branches`,
    /// `catalog-sync`.
    #[arg(long, value_name = "NAME")]
    pub generator: Option<String>,

    /// Override the worker pool size from `[suite].max_workers`.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LAKEBENCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the DAG plan, but don't execute any nodes.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
