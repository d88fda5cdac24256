// src/engine/runtime.rs

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dag::{TaskName, TaskRegistry};
use crate::errors::Result;
use crate::serve::ReloadHandle;

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    Startup,
    FileWatch,
}

/// Overall outcome of one scheduler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failed,
}

/// Events sent into the runtime from the watcher, finished runs, or external
/// signals.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered {
        task: TaskName,
        reason: TriggerReason,
    },
    RunFinished {
        task: TaskName,
        outcome: RunOutcome,
    },
    ShutdownRequested,
}

/// Options that influence how the runtime behaves.
#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Exit as soon as no run is in flight. Set in `--once` mode; watch mode
    /// keeps the loop alive indefinitely.
    pub exit_when_idle: bool,
}

/// The main orchestration loop.
///
/// A single loop consumes trigger, completion, and shutdown events. Each
/// trigger starts one scheduler invocation on a blocking worker thread;
/// pipelines block on file IO, so they stay off the async executor. Nothing
/// serializes independent triggers: overlapping runs are allowed, and
/// disjoint destinations are the config author's responsibility.
///
/// Stage failures never leave this loop. A failed run is logged and the
/// process keeps watching; only `--once` mode turns failures into a
/// non-zero exit.
pub struct Runtime {
    registry: Arc<TaskRegistry>,
    options: RuntimeOptions,
    events_rx: mpsc::Receiver<RuntimeEvent>,
    events_tx: mpsc::Sender<RuntimeEvent>,
    reload: Option<ReloadHandle>,
    in_flight: usize,
    any_failed: bool,
}

impl Runtime {
    pub fn new(
        registry: Arc<TaskRegistry>,
        options: RuntimeOptions,
        events_rx: mpsc::Receiver<RuntimeEvent>,
        events_tx: mpsc::Sender<RuntimeEvent>,
        reload: Option<ReloadHandle>,
    ) -> Self {
        Self {
            registry,
            options,
            events_rx,
            events_tx,
            reload,
            in_flight: 0,
            any_failed: false,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!("assetpipe runtime started");

        while let Some(event) = self.events_rx.recv().await {
            debug!(?event, "runtime received event");

            let keep_running = match event {
                RuntimeEvent::TaskTriggered { task, reason } => {
                    self.handle_trigger(task, reason);
                    true
                }
                RuntimeEvent::RunFinished { task, outcome } => {
                    self.handle_run_finished(task, outcome)
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested, stopping runtime");
                    false
                }
            };

            if !keep_running {
                break;
            }
        }

        info!("assetpipe runtime exiting");

        if self.options.exit_when_idle && self.any_failed {
            return Err(anyhow!("one or more tasks failed").into());
        }
        Ok(())
    }

    /// Start one scheduler invocation for `task` on a blocking worker.
    fn handle_trigger(&mut self, task: TaskName, reason: TriggerReason) {
        if !self.registry.contains(&task) {
            warn!(task = %task, "trigger for unknown task; ignoring");
            return;
        }

        info!(task = %task, ?reason, "task triggered");
        self.in_flight += 1;

        let registry = Arc::clone(&self.registry);
        let events_tx = self.events_tx.clone();

        tokio::task::spawn_blocking(move || {
            let outcome = match registry.run(&task) {
                Ok(report) if report.is_success() => RunOutcome::Success,
                Ok(report) => {
                    for (failed, message) in &report.failures {
                        warn!(task = %failed, %message, "task failed during run");
                    }
                    RunOutcome::Failed
                }
                Err(e) => {
                    error!(task = %task, error = %e, "run could not be planned");
                    RunOutcome::Failed
                }
            };

            // Runtime may already be gone on shutdown; nothing to do then.
            let _ = events_tx.blocking_send(RuntimeEvent::RunFinished { task, outcome });
        });
    }

    /// Account for a finished run; returns false when the loop should exit.
    fn handle_run_finished(&mut self, task: TaskName, outcome: RunOutcome) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        match outcome {
            RunOutcome::Success => {
                info!(task = %task, "run finished");
                if let Some(reload) = &self.reload {
                    reload.notify();
                }
            }
            RunOutcome::Failed => {
                warn!(task = %task, "run finished with failures");
                self.any_failed = true;
            }
        }

        if self.options.exit_when_idle && self.in_flight == 0 {
            info!("runtime idle and exit_when_idle=true, stopping");
            return false;
        }

        true
    }
}
