// src/pipeline/stage.rs

//! Transform stages.
//!
//! A stage is a pure `FileSet -> FileSet` function; the set is consumed by
//! value and a new one is returned, so data flow between stages is explicit.
//! The built-in stages cover the cheap structural transforms (concatenation,
//! renaming, filtering, gzip siblings); anything heavier plugs in through
//! the same trait.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use globset::{Glob, GlobMatcher};

use crate::config::model::StageConfig;
use crate::pipeline::fileset::{FileRecord, FileSet};

/// One transformation step in a pipeline.
pub trait Stage: Send + Sync {
    /// Stage name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Consume the input set and produce the output set.
    fn apply(&self, input: FileSet) -> Result<FileSet>;
}

/// Build a boxed stage from its config entry.
pub fn build_stage(cfg: &StageConfig) -> Result<Box<dyn Stage>> {
    let stage: Box<dyn Stage> = match cfg {
        StageConfig::Concat { output, separator } => Box::new(Concat {
            output: PathBuf::from(output),
            separator: separator.clone().unwrap_or_else(|| "\n".to_string()).into_bytes(),
        }),
        StageConfig::Rename {
            prefix,
            suffix,
            extension,
        } => Box::new(Rename {
            prefix: prefix.clone(),
            suffix: suffix.clone(),
            extension: extension
                .clone()
                .map(|e| e.trim_start_matches('.').to_string()),
        }),
        StageConfig::Filter { pattern } => Box::new(Filter {
            matcher: Glob::new(pattern)
                .with_context(|| format!("invalid filter pattern: {pattern}"))?
                .compile_matcher(),
        }),
        StageConfig::Gzip { threshold, level } => Box::new(Gzip {
            threshold: match threshold {
                Some(t) => parse_size(t).map_err(|e| anyhow!(e))?,
                None => 0,
            },
            level: match level {
                Some(l) => Compression::new(*l),
                None => Compression::default(),
            },
        }),
    };
    Ok(stage)
}

/// Concatenate every file in the set, in set order, into one output file.
pub struct Concat {
    pub output: PathBuf,
    pub separator: Vec<u8>,
}

impl Stage for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet> {
        if input.is_empty() {
            return Ok(FileSet::new());
        }

        let mut contents = Vec::new();
        for (i, record) in input.into_iter().enumerate() {
            if i > 0 {
                contents.extend_from_slice(&self.separator);
            }
            contents.extend_from_slice(&record.contents);
        }

        let mut out = FileSet::new();
        out.push(FileRecord::new(self.output.clone(), contents));
        Ok(out)
    }
}

/// Rewrite destination paths.
///
/// `prefix` is prepended to the file name, `suffix` is inserted before the
/// extension (`app.js` + suffix `.min` -> `app.min.js`), `extension`
/// replaces the extension. Directory components are preserved.
pub struct Rename {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub extension: Option<String>,
}

impl Stage for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet> {
        let mut out = FileSet::new();

        for mut record in input {
            let name = record
                .file_name()
                .ok_or_else(|| anyhow!("cannot rename file with no name: {:?}", record.path))?;

            let (stem, ext) = match name.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
                _ => (name, None),
            };

            let mut renamed = String::new();
            if let Some(prefix) = &self.prefix {
                renamed.push_str(prefix);
            }
            renamed.push_str(stem);
            if let Some(suffix) = &self.suffix {
                renamed.push_str(suffix);
            }
            match (&self.extension, ext) {
                (Some(new_ext), _) => {
                    renamed.push('.');
                    renamed.push_str(new_ext);
                }
                (None, Some(ext)) => {
                    renamed.push('.');
                    renamed.push_str(ext);
                }
                (None, None) => {}
            }

            record.path = match record.path.parent() {
                Some(parent) if parent.as_os_str().is_empty() => PathBuf::from(renamed),
                Some(parent) => parent.join(renamed),
                None => PathBuf::from(renamed),
            };
            out.push(record);
        }

        Ok(out)
    }
}

/// Keep only files whose destination-relative path matches the glob.
pub struct Filter {
    pub matcher: GlobMatcher,
}

impl Stage for Filter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet> {
        Ok(input
            .into_iter()
            .filter(|record| self.matcher.is_match(&record.path))
            .collect())
    }
}

/// Add a `.gz` sibling for every file at or above the size threshold.
///
/// Originals stay in the set; each qualifying file is followed by a record
/// with `.gz` appended to its name and gzip-compressed contents.
pub struct Gzip {
    pub threshold: u64,
    pub level: Compression,
}

impl Stage for Gzip {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn apply(&self, input: FileSet) -> Result<FileSet> {
        let mut out = FileSet::new();

        for record in input {
            let compressed = if record.contents.len() as u64 >= self.threshold {
                let mut encoder = GzEncoder::new(Vec::new(), self.level);
                encoder
                    .write_all(&record.contents)
                    .with_context(|| format!("compressing {:?}", record.path))?;
                let bytes = encoder
                    .finish()
                    .with_context(|| format!("compressing {:?}", record.path))?;

                let mut gz_path = record.path.clone().into_os_string();
                gz_path.push(".gz");
                Some(FileRecord::new(PathBuf::from(gz_path), bytes))
            } else {
                None
            };

            out.push(record);
            if let Some(gz) = compressed {
                out.push(gz);
            }
        }

        Ok(out)
    }
}

/// Parse a size string like `"1kb"`, `"512b"`, `"2mb"` or a bare byte count.
///
/// Intentionally minimal; it covers the forms that appear in configs.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return Err("empty size string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(s.len());

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid size number '{num_part}': {e}"))?;

    match unit_part.trim() {
        "" | "b" => Ok(value),
        "kb" | "k" => Ok(value * 1024),
        "mb" | "m" => Ok(value * 1024 * 1024),
        unit => Err(format!("unsupported size unit '{unit}'; expected b, kb, or mb")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_size_accepts_common_units() {
        assert_eq!(parse_size("0"), Ok(0));
        assert_eq!(parse_size("512b"), Ok(512));
        assert_eq!(parse_size("1kb"), Ok(1024));
        assert_eq!(parse_size("2mb"), Ok(2 * 1024 * 1024));
        assert_eq!(parse_size(" 4K "), Ok(4096));
    }

    #[test]
    fn parse_size_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("kb").is_err());
        assert!(parse_size("1gb").is_err());
    }

    #[test]
    fn rename_suffix_goes_before_extension() {
        let stage = Rename {
            prefix: None,
            suffix: Some(".min".to_string()),
            extension: None,
        };

        let mut input = FileSet::new();
        input.push(FileRecord::new("js/app.js", b"x".to_vec()));

        let out = stage.apply(input).unwrap();
        assert_eq!(out.records()[0].path, PathBuf::from("js/app.min.js"));
    }
}
