// src/globs.rs

//! Small glob-structure helpers shared by the pipeline runner and the watch
//! dispatcher.

use std::path::{Component, Path, PathBuf};

/// Split a glob pattern into its static directory prefix and the dynamic
/// remainder.
///
/// The prefix is the longest leading run of components without glob
/// metacharacters (`*`, `?`, `[`). For a pattern with no metacharacters at
/// all, the final component is treated as the remainder, so the prefix of a
/// concrete file path is its parent directory.
///
/// ```text
/// "assets/js/**/*.js"   -> ("assets/js", "**/*.js")
/// "assets/css/base.css" -> ("assets/css", "base.css")
/// "*.txt"               -> ("", "*.txt")
/// ```
///
/// The prefix is what the pipeline runner strips to obtain
/// destination-relative paths, and what the watcher registers with the
/// filesystem notifier.
pub fn split_static_prefix(pattern: &str) -> (PathBuf, String) {
    let path = Path::new(pattern);
    let components: Vec<Component<'_>> = path.components().collect();

    let split_idx = components
        .iter()
        .position(|c| {
            c.as_os_str()
                .to_str()
                .is_some_and(|s| s.contains(['*', '?', '[']))
        })
        .unwrap_or_else(|| components.len().saturating_sub(1));

    let prefix: PathBuf = components.iter().take(split_idx).collect();
    let remainder: PathBuf = components.iter().skip(split_idx).collect();

    (prefix, remainder.to_string_lossy().replace('\\', "/"))
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_pattern_splits_at_first_glob_component() {
        let (prefix, rest) = split_static_prefix("assets/js/**/*.js");
        assert_eq!(prefix, PathBuf::from("assets/js"));
        assert_eq!(rest, "**/*.js");
    }

    #[test]
    fn concrete_file_prefix_is_parent() {
        let (prefix, rest) = split_static_prefix("assets/css/base.css");
        assert_eq!(prefix, PathBuf::from("assets/css"));
        assert_eq!(rest, "base.css");
    }

    #[test]
    fn bare_wildcard_has_empty_prefix() {
        let (prefix, rest) = split_static_prefix("*.txt");
        assert_eq!(prefix, PathBuf::new());
        assert_eq!(rest, "*.txt");
    }

    #[test]
    fn relative_str_uses_forward_slashes() {
        let root = Path::new("/project");
        let path = Path::new("/project/assets/js/app.js");
        assert_eq!(
            relative_str(root, path).as_deref(),
            Some("assets/js/app.js")
        );
        assert_eq!(relative_str(Path::new("/other"), path), None);
    }
}
