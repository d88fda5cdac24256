// src/pipeline/mod.rs

//! File pipelines.
//!
//! - [`fileset`] is the ordered set of file records a pipeline owns as it
//!   moves stage to stage.
//! - [`stage`] defines the `Stage` trait and the built-in transforms.
//! - [`runner`] composes stages sequentially and handles the read-sources /
//!   write-destination ends of a task's build action.

pub mod fileset;
pub mod runner;
pub mod stage;

pub use fileset::{FileRecord, FileSet};
pub use runner::{BuildAction, Pipeline};
pub use stage::{build_stage, parse_size, Stage};
