// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// default_task = "default"
///
/// [server]
/// host = "127.0.0.1"
/// port = 8001
/// root = "app"
///
/// [task.scripts]
/// src = ["assets/js/**/*.js"]
/// dest = "app/js"
/// watch = ["assets/js/**/*.js"]
/// pipeline = [{ stage = "concat", output = "app.js", separator = ";" }]
/// ```
///
/// All sections except `[task.<name>]` are optional and have defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Defaults applied across tasks from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// Dev server settings from `[server]`; absent means no server.
    #[serde(default)]
    pub server: Option<ServerSection>,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Task to run when the CLI is invoked without a task name.
    #[serde(default = "default_task_name")]
    pub default_task: String,
}

fn default_task_name() -> String {
    "default".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            default_task: default_task_name(),
        }
    }
}

/// `[default]` section.
///
/// ```toml
/// [default]
/// exclude = ["**/*~", "**/.DS_Store"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Exclude patterns merged into every watch binding.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[server]` section: static file server plus live reload.
///
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// port = 8001
/// root = "app"
/// live_reload = true
/// live_reload_port = 35729
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as the site root, relative to the project root.
    pub root: String,

    /// Whether to run the live-reload WebSocket endpoint.
    #[serde(default = "default_true")]
    pub live_reload: bool,

    /// Port for the live-reload WebSocket endpoint.
    #[serde(default = "default_live_reload_port")]
    pub live_reload_port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_true() -> bool {
    true
}

fn default_live_reload_port() -> u16 {
    35729
}

/// `[task.<name>]` section.
///
/// A task with `src` and `dest` builds a pipeline; a task with neither is an
/// aggregate that only exists to pull in its `after` prerequisites.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TaskConfig {
    /// Source globs, evaluated in order relative to the project root.
    #[serde(default)]
    pub src: Vec<String>,

    /// Destination directory, relative to the project root.
    #[serde(default)]
    pub dest: Option<String>,

    /// Ordered transform stages applied between `src` and `dest`.
    ///
    /// An empty pipeline copies the sources verbatim.
    #[serde(default)]
    pub pipeline: Vec<StageConfig>,

    /// Prerequisite tasks, each run before this one.
    #[serde(default)]
    pub after: Vec<String>,

    /// Watch globs; a matching filesystem change re-runs this task.
    #[serde(default)]
    pub watch: Vec<String>,
}

/// One entry of a task's `pipeline` array.
///
/// ```toml
/// pipeline = [
///   { stage = "concat", output = "app.js", separator = ";" },
///   { stage = "rename", suffix = ".min" },
///   { stage = "gzip", threshold = "1kb", level = 9 },
/// ]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum StageConfig {
    /// Concatenate every file in the set into a single output file.
    Concat {
        output: String,
        #[serde(default)]
        separator: Option<String>,
    },

    /// Rewrite destination paths (suffix goes before the extension).
    Rename {
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default)]
        suffix: Option<String>,
        #[serde(default)]
        extension: Option<String>,
    },

    /// Keep only files whose destination-relative path matches the glob.
    Filter { pattern: String },

    /// Add a `.gz` sibling for every file at or above `threshold` bytes.
    Gzip {
        #[serde(default)]
        threshold: Option<String>,
        #[serde(default)]
        level: Option<u32>,
    },
}

impl StageConfig {
    /// Stage name as written in the config, used in error reports.
    pub fn name(&self) -> &'static str {
        match self {
            StageConfig::Concat { .. } => "concat",
            StageConfig::Rename { .. } => "rename",
            StageConfig::Filter { .. } => "filter",
            StageConfig::Gzip { .. } => "gzip",
        }
    }
}
