// src/dag/assemble.rs

use std::path::Path;

use crate::config::model::ConfigFile;
use crate::dag::registry::TaskRegistry;
use crate::errors::Result;
use crate::pipeline::BuildAction;

/// Turn a validated config into a task registry.
///
/// Tasks with `src`/`dest` get a pipeline build action; tasks without are
/// aggregates that exist only for their `after` list. The registry is
/// resolved before being returned, so unknown prerequisite references fail
/// here rather than on first run.
pub fn registry_from_config(cfg: &ConfigFile, project_root: &Path) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();

    for (name, task) in cfg.task.iter() {
        match &task.dest {
            Some(dest) => {
                let action = BuildAction::from_task(project_root, task, dest)?;
                let task_name = name.clone();
                registry.register(
                    name.clone(),
                    task.after.clone(),
                    Box::new(move || action.execute(&task_name).map(|_| ())),
                )?;
            }
            None => {
                registry.register_aggregate(name.clone(), task.after.clone())?;
            }
        }
    }

    registry.resolve()?;
    Ok(registry)
}
