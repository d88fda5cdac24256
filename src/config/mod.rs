// src/config/mod.rs

//! Configuration loading and validation for assetpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate semantic invariants like dependency-graph correctness
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, DefaultSection, ServerSection, StageConfig, TaskConfig};
pub use validate::validate_config;
