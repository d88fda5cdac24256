// src/watch/mod.rs

//! File watching and change dispatch.
//!
//! This module is responsible for:
//! - Compiling per-task watch bindings from the config (`patterns.rs`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) that turns
//!   matching changes into task-level triggers (`watcher.rs`).
//!
//! It does **not** know about task dependencies; the engine resolves those
//! when it handles a trigger.

pub mod patterns;
pub mod watcher;

pub use patterns::{build_watch_bindings, collapse_roots, WatchBinding};
pub use watcher::{spawn_watcher, WatcherHandle};
