// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};

use crate::config::model::ConfigFile;
use crate::dag::TaskName;
use crate::errors::{AssetpipeError, Result};
use crate::globs::split_static_prefix;

/// One watch binding: a glob pattern associated with the task to re-run when
/// a matching path changes.
///
/// Patterns are relative to the project root; the watcher passes
/// root-relative paths (e.g. `"assets/js/app.js"`) into [`matches`].
///
/// [`matches`]: WatchBinding::matches
pub struct WatchBinding {
    task: TaskName,
    pattern: String,
    matcher: GlobMatcher,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("task", &self.task)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn new(
        task: impl Into<TaskName>,
        pattern: impl Into<String>,
        exclude: &[String],
    ) -> Result<Self> {
        let task = task.into();
        let pattern = pattern.into();

        let matcher = Glob::new(&pattern)
            .map_err(|e| AssetpipeError::Config(format!("invalid watch pattern '{pattern}': {e}")))?
            .compile_matcher();

        let exclude = if exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pat in exclude {
                let glob = Glob::new(pat).map_err(|e| {
                    AssetpipeError::Config(format!("invalid exclude pattern '{pat}': {e}"))
                })?;
                builder.add(glob);
            }
            Some(builder.build().map_err(|e| {
                AssetpipeError::Config(format!("building exclude set: {e}"))
            })?)
        };

        Ok(Self {
            task,
            pattern,
            matcher,
            exclude,
        })
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True if this binding's task should re-run for the given root-relative
    /// path.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.matcher.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Directory the filesystem notifier must observe for this binding: the
    /// pattern's static prefix under the project root.
    ///
    /// A missing directory is a watch setup error for this binding alone;
    /// callers drop the binding and keep the others.
    pub fn static_root(&self, project_root: &Path) -> Result<PathBuf> {
        let (prefix, _) = split_static_prefix(&self.pattern);
        let dir = project_root.join(prefix);

        if !dir.is_dir() {
            return Err(AssetpipeError::Watch {
                pattern: self.pattern.clone(),
                message: format!("watch root {:?} does not exist", dir),
            });
        }

        dir.canonicalize().map_err(|e| AssetpipeError::Watch {
            pattern: self.pattern.clone(),
            message: format!("canonicalizing watch root {:?}: {e}", dir),
        })
    }
}

/// Build one binding per `(task, watch pattern)` pair in the config, with
/// `[default].exclude` merged into each.
pub fn build_watch_bindings(cfg: &ConfigFile) -> Result<Vec<WatchBinding>> {
    let mut bindings = Vec::new();

    for (name, task) in cfg.task.iter() {
        for pattern in task.watch.iter() {
            bindings.push(WatchBinding::new(
                name.clone(),
                pattern.clone(),
                &cfg.default.exclude,
            )?);
        }
    }

    Ok(bindings)
}

/// Reduce a list of watch roots to the minimal set.
///
/// The notifier watches recursively, so a root that lies under an earlier
/// accepted root is redundant.
pub fn collapse_roots(mut roots: Vec<PathBuf>) -> Vec<PathBuf> {
    roots.sort();
    roots.dedup();

    let mut collapsed: Vec<PathBuf> = Vec::new();
    for root in roots {
        if let Some(last) = collapsed.last() {
            if root.starts_with(last) {
                continue;
            }
        }
        collapsed.push(root);
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_drops_nested_roots_only() {
        let roots = vec![
            PathBuf::from("/a/b"),
            PathBuf::from("/a"),
            PathBuf::from("/a/b/c"),
            PathBuf::from("/foo"),
            PathBuf::from("/foo-bar"),
        ];

        assert_eq!(
            collapse_roots(roots),
            vec![
                PathBuf::from("/a"),
                PathBuf::from("/foo"),
                PathBuf::from("/foo-bar"),
            ]
        );
    }
}
