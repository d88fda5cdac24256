// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (dependency graph correctness, etc.). Use [`load_and_validate`]
/// for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run semantic validation.
///
/// This is the entry point for the rest of the application:
///
/// - Reads TOML, applying defaults via `serde` + `Default` impls.
/// - Checks unknown `after` references, dependency cycles, stage options,
///   and `[server]` sanity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Default config path: `Assetpipe.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Assetpipe.toml")
}
