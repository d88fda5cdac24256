// src/config/validate.rs

use globset::Glob;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, StageConfig, TaskConfig};
use crate::errors::{AssetpipeError, Result};
use crate::pipeline::stage::parse_size;

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one task
/// - all `after` dependencies refer to existing tasks
/// - the task graph has no cycles
/// - per-task src/dest/pipeline consistency and stage options
/// - watch globs are syntactically valid
/// - `[server]` settings are usable
///
/// It does **not** check that watched directories exist; that is a
/// per-binding concern handled when the watcher is set up.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    for (name, task) in cfg.task.iter() {
        validate_task(name, task)?;
    }
    validate_server(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &ConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(AssetpipeError::Config(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if !cfg.task.contains_key(dep) {
                return Err(AssetpipeError::UnknownDependency {
                    task: name.clone(),
                    dependency: dep.clone(),
                });
            }
            if dep == name {
                return Err(AssetpipeError::Cycle(format!("{name} -> {name}")));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &ConfigFile) -> Result<()> {
    // Edge direction: dep -> task. For:
    //   [task.build]
    //   after = ["clean"]
    // we add edge clean -> build.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    // A topological sort fails iff there is a cycle. The execution planner
    // re-detects cycles with a full path for its own error message; here we
    // just refuse the config early.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(AssetpipeError::Cycle(format!(
            "task '{}' is part of a dependency cycle",
            cycle.node_id()
        ))),
    }
}

fn validate_task(name: &str, task: &TaskConfig) -> Result<()> {
    if !task.src.is_empty() && task.dest.is_none() {
        return Err(AssetpipeError::Config(format!(
            "task '{name}' has `src` but no `dest`"
        )));
    }
    if task.src.is_empty() && task.dest.is_some() {
        return Err(AssetpipeError::Config(format!(
            "task '{name}' has `dest` but no `src`"
        )));
    }
    if task.src.is_empty() && !task.pipeline.is_empty() {
        return Err(AssetpipeError::Config(format!(
            "task '{name}' has a pipeline but no `src`"
        )));
    }

    for stage in task.pipeline.iter() {
        validate_stage(name, stage)?;
    }

    for pattern in task.watch.iter() {
        Glob::new(pattern).map_err(|e| {
            AssetpipeError::Config(format!(
                "task '{name}' has invalid watch pattern '{pattern}': {e}"
            ))
        })?;
    }

    Ok(())
}

fn validate_stage(task: &str, stage: &StageConfig) -> Result<()> {
    let bad = |msg: String| {
        Err(AssetpipeError::Config(format!(
            "task '{task}', stage '{}': {msg}",
            stage.name()
        )))
    };

    match stage {
        StageConfig::Concat { output, .. } => {
            if output.is_empty() {
                return bad("`output` must not be empty".to_string());
            }
        }
        StageConfig::Rename {
            prefix,
            suffix,
            extension,
        } => {
            if prefix.is_none() && suffix.is_none() && extension.is_none() {
                return bad(
                    "at least one of `prefix`, `suffix`, `extension` is required".to_string(),
                );
            }
        }
        StageConfig::Filter { pattern } => {
            if let Err(e) = Glob::new(pattern) {
                return bad(format!("invalid pattern '{pattern}': {e}"));
            }
        }
        StageConfig::Gzip { threshold, level } => {
            if let Some(t) = threshold {
                if let Err(e) = parse_size(t) {
                    return bad(format!("invalid threshold '{t}': {e}"));
                }
            }
            if let Some(level) = level {
                if *level > 9 {
                    return bad(format!("level must be 0..=9 (got {level})"));
                }
            }
        }
    }

    Ok(())
}

fn validate_server(cfg: &ConfigFile) -> Result<()> {
    let Some(server) = &cfg.server else {
        return Ok(());
    };

    if server.root.is_empty() {
        return Err(AssetpipeError::Config(
            "[server].root must not be empty".to_string(),
        ));
    }
    if server.live_reload && server.live_reload_port == server.port {
        return Err(AssetpipeError::Config(format!(
            "[server].live_reload_port must differ from [server].port (both are {})",
            server.port
        )));
    }

    Ok(())
}
