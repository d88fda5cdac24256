// src/watch/watcher.rs

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dag::TaskName;
use crate::engine::{RuntimeEvent, TriggerReason};
use crate::errors::Result;
use crate::globs::relative_str;
use crate::watch::patterns::{collapse_roots, WatchBinding};

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher for the given bindings and forward
/// `RuntimeEvent::TaskTriggered` for every matching change.
///
/// Bindings whose static watch root cannot be set up are reported and
/// dropped; the remaining bindings are still established. Matching happens
/// against paths relative to `project_root`.
pub fn spawn_watcher(
    project_root: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let project_root = project_root.into();
    let project_root = project_root
        .canonicalize()
        .unwrap_or_else(|_| project_root.clone());

    // Per-binding setup: a missing root disables that binding only.
    let mut roots = Vec::new();
    let mut active = Vec::new();
    for binding in bindings {
        match binding.static_root(&project_root) {
            Ok(root) => {
                roots.push(root);
                active.push(binding);
            }
            Err(e) => {
                error!(task = binding.task(), error = %e, "dropping watch binding");
            }
        }
    }

    if active.is_empty() {
        warn!("no usable watch bindings; file watching is effectively off");
    }

    let bindings = Arc::new(active);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // tracing is unavailable inside the notify callback thread
                    // once the runtime shuts down; stderr is the fallback.
                    eprintln!("assetpipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetpipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    for root in collapse_roots(roots) {
        info!(root = %root.display(), "watching");
        watcher.watch(&root, RecursiveMode::Recursive)?;
    }

    // Async task that turns notify events into task triggers. No debouncing:
    // every matching event produces one trigger per bound task.
    let async_bindings = Arc::clone(&bindings);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            let mut triggered: HashSet<TaskName> = HashSet::new();
            for path in &event.paths {
                let Some(rel) = relative_str(&project_root, path) else {
                    debug!(?path, "event path outside project root; ignoring");
                    continue;
                };

                for binding in async_bindings.iter() {
                    if binding.matches(&rel) {
                        triggered.insert(binding.task().to_string());
                    }
                }
            }

            for task in triggered {
                debug!(task = %task, "watch match, triggering task");
                if runtime_tx
                    .send(RuntimeEvent::TaskTriggered {
                        task,
                        reason: TriggerReason::FileWatch,
                    })
                    .await
                    .is_err()
                {
                    // Runtime is gone; no point keeping the loop alive.
                    debug!("runtime channel closed, stopping watch loop");
                    return;
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}
