//! In-memory mirror of the repository's source files.
//!
//! A snapshot is loaded once by [`RepositorySnapshot::collect`] and then
//! kept in sync with disk by [`crate::writeback::write_back`], which is the
//! only code allowed to change it. Paths are stored relative to the
//! repository root and are unique within a snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{CoreError, CoreResult};
use crate::repository::Repository;

/// A single collected source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the repository root
    pub path: PathBuf,
    /// Full file content
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Ordered, path-unique collection of source files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositorySnapshot {
    files: Vec<SourceFile>,
}

impl RepositorySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from files, keeping the last content seen for each path.
    pub fn from_files(files: impl IntoIterator<Item = SourceFile>) -> Self {
        let mut snapshot = Self::new();
        for file in files {
            snapshot.upsert(file.path, file.content);
        }
        snapshot
    }

    /// Walk the repository root and load every matching file.
    ///
    /// A file is loaded when its name contains one of the include substrings
    /// and none of its root-relative segments is excluded. Excluded
    /// directories are not descended into. Any unreadable entry aborts the
    /// collection.
    pub fn collect(repo: &Repository) -> CoreResult<Self> {
        if !repo.root.is_dir() {
            return Err(CoreError::RootNotFound(repo.root.clone()));
        }

        info!("Collecting repository content from {}", repo.root.display());

        let root = repo.root.as_path();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                !repo.is_excluded(relative)
            });

        let mut snapshot = Self::new();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !repo.is_included(&file_name) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf());
            let content = fs::read_to_string(entry.path())
                .map_err(|e| CoreError::read(entry.path(), e))?;

            debug!(path = %relative.display(), bytes = content.len(), "collected file");
            snapshot.upsert(relative, content);
        }

        info!("Collected {} files", snapshot.len());
        Ok(snapshot)
    }

    /// All files in collection order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Look up a file by its root-relative path.
    pub fn get(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|file| file.path == path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Root-relative paths in collection order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|file| file.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Update a file in place or append it.
    ///
    /// Returns `true` when the file was appended. Entries are never removed.
    pub(crate) fn upsert(&mut self, path: PathBuf, content: String) -> bool {
        match self.files.iter_mut().find(|file| file.path == path) {
            Some(existing) => {
                existing.content = content;
                false
            }
            None => {
                self.files.push(SourceFile { path, content });
                true
            }
        }
    }
}
