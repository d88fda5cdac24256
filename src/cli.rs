// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Run declarative asset pipelines with file watching and live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run.
    ///
    /// If omitted, `default_task` from the `[config]` section is used
    /// (which itself defaults to "default").
    #[arg(value_name = "TASK")]
    pub task: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Assetpipe.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Assetpipe.toml")]
    pub config: String,

    /// Build once and exit; no file watching, no dev server.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print tasks, but don't execute anything.
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
