// src/dag/plan.rs

use std::collections::HashMap;

use crate::dag::registry::{TaskName, TaskRegistry};
use crate::errors::{AssetpipeError, Result};

/// A resolved execution order: transitive prerequisites first, each task
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: Vec<TaskName>,
}

impl ExecutionPlan {
    pub fn order(&self) -> &[TaskName] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    /// On the recursion stack; seeing this again means a cycle.
    Visiting,
    /// Fully expanded and already placed in the order.
    Done,
}

/// Depth-first postorder walk of the prerequisite graph rooted at `root`.
///
/// The recursion-stack visited-set doubles as the cycle detector: revisiting
/// a task that is still `Visiting` closes a cycle, and the error names every
/// task on the cycle path.
pub(crate) fn plan_for(registry: &TaskRegistry, root: &str) -> Result<ExecutionPlan> {
    let mut states: HashMap<TaskName, VisitState> = HashMap::new();
    let mut stack: Vec<TaskName> = Vec::new();
    let mut order: Vec<TaskName> = Vec::new();

    visit(registry, root, None, &mut states, &mut stack, &mut order)?;

    Ok(ExecutionPlan { order })
}

fn visit(
    registry: &TaskRegistry,
    name: &str,
    parent: Option<&str>,
    states: &mut HashMap<TaskName, VisitState>,
    stack: &mut Vec<TaskName>,
    order: &mut Vec<TaskName>,
) -> Result<()> {
    match states.get(name) {
        Some(VisitState::Done) => return Ok(()),
        Some(VisitState::Visiting) => {
            return Err(AssetpipeError::Cycle(render_cycle(stack, name)));
        }
        None => {}
    }

    let Some(task) = registry.get(name) else {
        return Err(match parent {
            Some(parent) => AssetpipeError::UnknownDependency {
                task: parent.to_string(),
                dependency: name.to_string(),
            },
            None => AssetpipeError::UnknownTask(name.to_string()),
        });
    };

    states.insert(name.to_string(), VisitState::Visiting);
    stack.push(name.to_string());

    for dep in task.after() {
        visit(registry, dep, Some(name), states, stack, order)?;
    }

    stack.pop();
    states.insert(name.to_string(), VisitState::Done);
    order.push(name.to_string());

    Ok(())
}

/// Render the offending cycle as `a -> b -> a`, starting from the first
/// occurrence of the revisited task on the stack.
fn render_cycle(stack: &[TaskName], repeated: &str) -> String {
    let start = stack
        .iter()
        .position(|n| n == repeated)
        .unwrap_or(0);

    let mut parts: Vec<&str> = stack[start..].iter().map(|s| s.as_str()).collect();
    parts.push(repeated);
    parts.join(" -> ")
}
