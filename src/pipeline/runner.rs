// src/pipeline/runner.rs

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::model::{StageConfig, TaskConfig};
use crate::errors::{AssetpipeError, Result};
use crate::globs::split_static_prefix;
use crate::pipeline::fileset::{FileRecord, FileSet};
use crate::pipeline::stage::{build_stage, Stage};

/// An ordered list of stages combined by sequential composition.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn from_config(stages: &[StageConfig]) -> Result<Self> {
        let stages = stages
            .iter()
            .map(build_stage)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::new(stages))
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Thread the set through every stage in order.
    ///
    /// The first failing stage aborts the run; its error carries the stage
    /// name so the report names the step that rejected its input.
    pub fn run(&self, input: FileSet) -> Result<FileSet> {
        let mut files = input;
        for stage in &self.stages {
            debug!(stage = stage.name(), files = files.len(), "applying stage");
            files = stage.apply(files).map_err(|e| AssetpipeError::Stage {
                stage: stage.name().to_string(),
                message: format!("{e:#}"),
            })?;
        }
        Ok(files)
    }
}

/// The build action behind a pipeline task: read the source globs, run the
/// stages, write the result under the destination directory.
pub struct BuildAction {
    root: PathBuf,
    sources: Vec<String>,
    dest: PathBuf,
    pipeline: Pipeline,
}

impl BuildAction {
    /// Build the action for a task config with `src` and `dest`.
    pub fn from_task(root: impl Into<PathBuf>, task: &TaskConfig, dest: &str) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            sources: task.src.clone(),
            dest: PathBuf::from(dest),
            pipeline: Pipeline::from_config(&task.pipeline)?,
        })
    }

    /// Run the pipeline once. Returns the number of files written.
    pub fn execute(&self, task_name: &str) -> Result<usize> {
        let input = self.collect_sources()?;
        debug!(task = %task_name, files = input.len(), "collected source files");

        let output = self.pipeline.run(input)?;
        let written = self.write_output(output)?;

        info!(task = %task_name, files = written, dest = %self.dest.display(), "task output written");
        Ok(written)
    }

    /// Enumerate source files glob by glob, in declared order.
    ///
    /// Within one glob, entries come back in the alphabetical order `glob`
    /// yields them, so a run is deterministic. A file matched by two globs is
    /// read once per match; configs that care (concat order) list disjoint
    /// globs, as the examples do.
    fn collect_sources(&self) -> Result<FileSet> {
        let mut files = FileSet::new();

        for pattern in &self.sources {
            let (prefix, _) = split_static_prefix(pattern);
            let base = self.root.join(prefix);
            let full_pattern = self.root.join(pattern);
            let full_pattern = full_pattern.to_string_lossy();

            let entries = glob::glob(&full_pattern)
                .map_err(|e| AssetpipeError::Config(format!("invalid src glob '{pattern}': {e}")))?;

            for entry in entries {
                let path = entry
                    .map_err(|e| anyhow::anyhow!("reading glob entry for '{pattern}': {e}"))?;
                if !path.is_file() {
                    continue;
                }

                let contents = fs::read(&path)
                    .with_context(|| format!("reading source file {:?}", path))?;
                let rel = path
                    .strip_prefix(&base)
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|_| {
                        PathBuf::from(path.file_name().unwrap_or(path.as_os_str()))
                    });

                files.push(FileRecord::new(rel, contents).with_source(path));
            }
        }

        Ok(files)
    }

    /// Write each record under `dest`, creating directories as needed.
    fn write_output(&self, output: FileSet) -> Result<usize> {
        let dest_root = self.root.join(&self.dest);
        let mut written = 0;

        for record in output {
            let target = dest_root.join(&record.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating output directory {:?}", parent))?;
            }
            fs::write(&target, &record.contents)
                .with_context(|| format!("writing output file {:?}", target))?;
            written += 1;
        }

        Ok(written)
    }
}
