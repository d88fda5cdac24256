// src/pipeline/fileset.rs

use std::path::{Path, PathBuf};

/// One file flowing through a pipeline.
///
/// `path` is relative to the task's destination directory; it is what the
/// final write step joins onto `dest`. `source` records where the contents
/// originally came from on disk, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    pub source: Option<PathBuf>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            contents,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// File name portion of the destination path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// An ordered set of files owned by exactly one pipeline stage at a time.
///
/// Each stage consumes the set it receives by value and produces a new one;
/// there is no aliasing between stages. Order is significant: the concat
/// stage, for example, joins contents in set order.
#[derive(Debug, Default)]
pub struct FileSet {
    records: Vec<FileRecord>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FileRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FileRecord> {
        self.records
    }

    /// Destination-relative paths in set order, mainly for logs and tests.
    pub fn paths(&self) -> Vec<&Path> {
        self.records.iter().map(|r| r.path.as_path()).collect()
    }
}

impl FromIterator<FileRecord> for FileSet {
    fn from_iter<T: IntoIterator<Item = FileRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FileSet {
    type Item = FileRecord;
    type IntoIter = std::vec::IntoIter<FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
