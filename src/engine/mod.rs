// src/engine/mod.rs

//! Orchestration engine.
//!
//! Ties together the task registry, the file watcher, and the dev server's
//! reload channel behind one event loop that reacts to:
//! - file-watch triggers
//! - run completions
//! - shutdown signals

pub mod runtime;

pub use runtime::{RunOutcome, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
