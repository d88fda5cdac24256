// src/serve/mod.rs

//! Dev server: static file serving plus the live-reload push channel.
//!
//! Both are external collaborators from the engine's point of view; the
//! engine only holds a [`ReloadHandle`] and calls `notify` after a fully
//! successful run.

pub mod http;
pub mod livereload;

pub use http::spawn_http;
pub use livereload::ReloadHandle;
