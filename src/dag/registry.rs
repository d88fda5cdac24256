// src/dag/registry.rs

use std::collections::BTreeMap;

use tracing::{error, info};

use crate::dag::plan::{plan_for, ExecutionPlan};
use crate::errors::{AssetpipeError, Result};

/// Public type alias for task names throughout the crate.
pub type TaskName = String;

/// A task's build action. Pipeline tasks close over a
/// [`BuildAction`](crate::pipeline::BuildAction); aggregate tasks are no-ops.
pub type TaskAction = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// A named unit of build work with declared prerequisites.
pub struct Task {
    name: TaskName,
    after: Vec<TaskName>,
    action: TaskAction,
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn after(&self) -> &[TaskName] {
        &self.after
    }
}

/// Outcome of one `run` invocation.
///
/// `executed` lists every task whose action ran, in execution order;
/// `failures` the subset that returned an error, with the rendered message.
#[derive(Debug, Default)]
pub struct RunReport {
    pub executed: Vec<TaskName>,
    pub failures: Vec<(TaskName, String)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Explicit task registry: constructed once at startup and passed by
/// reference into the engine and the watch dispatcher. Tasks are registered
/// once and never mutated afterwards.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a task. Registering the same name twice is a configuration
    /// error.
    pub fn register(
        &mut self,
        name: impl Into<TaskName>,
        after: Vec<TaskName>,
        action: TaskAction,
    ) -> Result<()> {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(AssetpipeError::Config(format!(
                "task '{name}' is registered twice"
            )));
        }
        self.tasks.insert(
            name.clone(),
            Task {
                name,
                after,
                action,
            },
        );
        Ok(())
    }

    /// Register an aggregate task: prerequisites only, no action of its own.
    pub fn register_aggregate(
        &mut self,
        name: impl Into<TaskName>,
        after: Vec<TaskName>,
    ) -> Result<()> {
        self.register(name, after, Box::new(|| Ok(())))
    }

    /// Check, after all registrations, that every prerequisite refers to a
    /// registered task.
    pub fn resolve(&self) -> Result<()> {
        for task in self.tasks.values() {
            for dep in task.after() {
                if !self.tasks.contains_key(dep) {
                    return Err(AssetpipeError::UnknownDependency {
                        task: task.name().to_string(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Compute the execution order for `name`: transitive prerequisites,
    /// deduplicated, prerequisites before dependents. Fails on unknown tasks
    /// and on cycles, before any action has run.
    pub fn plan(&self, name: &str) -> Result<ExecutionPlan> {
        plan_for(self, name)
    }

    /// Execute `name`'s plan.
    ///
    /// Each task in the plan runs at most once. A failing action is recorded
    /// in the report and the remaining tasks still run; only planning errors
    /// (unknown task, cycle) abort the invocation as a whole.
    pub fn run(&self, name: &str) -> Result<RunReport> {
        let plan = self.plan(name)?;
        let mut report = RunReport::default();

        for task_name in plan.order() {
            // Planned names always resolve; the plan was built from this map.
            let Some(task) = self.tasks.get(task_name) else {
                continue;
            };

            match (task.action)() {
                Ok(()) => {
                    info!(task = %task.name, "task complete");
                }
                Err(e) => {
                    error!(task = %task.name, error = %e, "task failed");
                    report.failures.push((task.name.clone(), e.to_string()));
                }
            }
            report.executed.push(task.name.clone());
        }

        Ok(report)
    }
}
