// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod globs;
pub mod logging;
pub mod pipeline;
pub mod serve;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::registry_from_config;
use crate::engine::{Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::watch::build_watch_bindings;

pub use crate::errors::{AssetpipeError, Result};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - registry assembly and resolution
/// - dev server + live reload
/// - file watcher
/// - Ctrl-C handling
/// - the runtime event loop, seeded with the requested task
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let project_root = config_root_dir(&config_path);
    let registry = Arc::new(registry_from_config(&cfg, &project_root)?);

    let requested = args
        .task
        .clone()
        .unwrap_or_else(|| cfg.config.default_task.clone());
    if !registry.contains(&requested) {
        return Err(AssetpipeError::UnknownTask(requested));
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Dev server + live reload (skipped in --once mode).
    let mut reload = None;
    if !args.once {
        if let Some(server) = &cfg.server {
            serve::spawn_http(
                server.host.clone(),
                server.port,
                project_root.join(&server.root),
            );
            if server.live_reload {
                reload = Some(serve::livereload::spawn(&server.host, server.live_reload_port)?);
            }
        }
    }

    // Optional file watcher (disabled in --once mode).
    let _watcher_handle = if !args.once {
        let bindings = build_watch_bindings(&cfg)?;
        if bindings.is_empty() {
            info!("no watch bindings configured");
            None
        } else {
            Some(watch::spawn_watcher(
                project_root.clone(),
                bindings,
                rt_tx.clone(),
            )?)
        }
    } else {
        None
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    // Seed the initial run.
    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: requested,
            reason: TriggerReason::Startup,
        })
        .await
        .map_err(|e| anyhow::anyhow!("sending initial trigger: {e}"))?;

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    let runtime = Runtime::new(registry, options, rt_rx, rt_tx, reload);
    runtime.run().await
}

/// Figure out a sensible project root for sources, destinations, and
/// watching. Currently: directory containing the config file, or `.`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Simple dry-run output: print tasks, pipelines, and watch globs.
fn print_dry_run(cfg: &ConfigFile) {
    println!("assetpipe dry-run");
    println!("  config.default_task = {}", cfg.config.default_task);
    if let Some(server) = &cfg.server {
        println!(
            "  server: http://{}:{}/ serving {:?} (live_reload: {})",
            server.host, server.port, server.root, server.live_reload
        );
    }
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        if !task.src.is_empty() {
            println!("      src: {:?}", task.src);
        }
        if let Some(dest) = &task.dest {
            println!("      dest: {dest}");
        }
        if !task.pipeline.is_empty() {
            let stages: Vec<&str> = task.pipeline.iter().map(|s| s.name()).collect();
            println!("      pipeline: {}", stages.join(" -> "));
        }
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        if !task.watch.is_empty() {
            println!("      watch: {:?}", task.watch);
        }
    }
}
