use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use assetpipe::dag::TaskRegistry;

/// Build a registry from index-based dependency masks. Task `i` may only
/// depend on tasks with a lower index, so every generated graph is acyclic.
fn registry_from_masks(masks: &[u32], counts: &Arc<Mutex<Vec<usize>>>) -> TaskRegistry {
    let mut registry = TaskRegistry::new();

    for (i, mask) in masks.iter().enumerate() {
        let deps: Vec<String> = (0..i)
            .filter(|j| mask & (1 << j) != 0)
            .map(|j| format!("t{j}"))
            .collect();

        let counts = Arc::clone(counts);
        registry
            .register(
                format!("t{i}"),
                deps,
                Box::new(move || {
                    counts.lock().unwrap()[i] += 1;
                    Ok(())
                }),
            )
            .unwrap();
    }

    registry.resolve().unwrap();
    registry
}

proptest! {
    #[test]
    fn acyclic_graphs_plan_uniquely_and_run_each_task_once(
        masks in prop::collection::vec(any::<u32>(), 1..8)
    ) {
        let counts = Arc::new(Mutex::new(vec![0usize; masks.len()]));
        let registry = registry_from_masks(&masks, &counts);
        let root = format!("t{}", masks.len() - 1);

        let plan = registry.plan(&root).unwrap();

        // No duplicates.
        let unique: HashSet<_> = plan.order().iter().collect();
        prop_assert_eq!(unique.len(), plan.len());

        // Every prerequisite is placed before its dependent.
        for (pos, name) in plan.order().iter().enumerate() {
            for dep in registry.get(name).unwrap().after() {
                let dep_pos = plan.order().iter().position(|n| n == dep).unwrap();
                prop_assert!(dep_pos < pos, "{dep} must run before {name}");
            }
        }

        // Running the plan executes each reachable task exactly once and
        // touches nothing else.
        let report = registry.run(&root).unwrap();
        prop_assert!(report.is_success());

        let planned: HashSet<&str> = plan.order().iter().map(|s| s.as_str()).collect();
        let counts = counts.lock().unwrap();
        for (i, count) in counts.iter().enumerate() {
            let name = format!("t{i}");
            if planned.contains(name.as_str()) {
                prop_assert_eq!(*count, 1, "{} should run exactly once", name);
            } else {
                prop_assert_eq!(*count, 0, "{} is unreachable and must not run", name);
            }
        }
    }
}
