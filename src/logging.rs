// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `ASSETPIPE_LOG` environment variable (full env-filter syntax)
//! 3. default to `info`

use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;
use crate::errors::Result;

/// Initialise the global logging subscriber.
///
/// Safe to call once at startup; a second call panics, and we only call it
/// from `main`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(level_str(lvl)),
        None => EnvFilter::try_from_env("ASSETPIPE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

fn level_str(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
