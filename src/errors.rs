// src/errors.rs

//! Crate-wide error type.
//!
//! Configuration problems (unknown tasks, dependency cycles, bad TOML) are
//! fatal at startup and surface through `main` as a non-zero exit. Stage and
//! watch errors are recovered closer to where they happen: a failing stage
//! aborts one pipeline invocation, a failing watch binding is dropped, and
//! the process keeps running either way.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetpipeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown task '{0}'")]
    UnknownTask(String),

    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("dependency cycle detected: {0}")]
    Cycle(String),

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    #[error("cannot watch '{pattern}': {message}")]
    Watch { pattern: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AssetpipeError>;
