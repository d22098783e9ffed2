//! Repository description supplied by the caller before a run starts.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Markers whose presence in test output means the suite failed.
pub const DEFAULT_FAILURE_MARKERS: [&str; 2] = ["FAILURES", "ERRORS"];

/// The working tree a run operates on.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    /// Root of the working tree
    pub root: PathBuf,
    /// A file is collected when its name contains one of these substrings
    pub includes: Vec<String>,
    /// A file is skipped when any path segment equals one of these
    pub excludes: Vec<String>,
    /// Shell command that runs the test suite from the root
    pub test_command: String,
    /// Substrings that mark test output as failing
    pub failure_markers: Vec<String>,
    /// Upper bound for one test run (0 = no limit)
    pub test_timeout_secs: u64,
}

impl Repository {
    /// Create a repository with no filters and the default failure markers.
    pub fn new(root: impl Into<PathBuf>, test_command: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            includes: Vec::new(),
            excludes: Vec::new(),
            test_command: test_command.into(),
            failure_markers: DEFAULT_FAILURE_MARKERS.iter().map(|m| m.to_string()).collect(),
            test_timeout_secs: 0,
        }
    }

    /// Add an include substring.
    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.includes.push(include.into());
        self
    }

    /// Add several include substrings.
    pub fn with_includes(mut self, includes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.includes.extend(includes.into_iter().map(Into::into));
        self
    }

    /// Add an exclude segment.
    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.excludes.push(exclude.into());
        self
    }

    /// Add several exclude segments.
    pub fn with_excludes(mut self, excludes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excludes.extend(excludes.into_iter().map(Into::into));
        self
    }

    /// Replace the failure markers.
    pub fn with_failure_markers(
        mut self,
        markers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.failure_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Bound the duration of one test run.
    pub fn with_test_timeout(mut self, secs: u64) -> Self {
        self.test_timeout_secs = secs;
        self
    }

    /// Replace the root, keeping every other setting.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Test timeout as a duration, if one is set.
    pub fn test_timeout(&self) -> Option<Duration> {
        (self.test_timeout_secs > 0).then(|| Duration::from_secs(self.test_timeout_secs))
    }

    /// Whether a file name matches at least one include substring.
    pub fn is_included(&self, file_name: &str) -> bool {
        self.includes
            .iter()
            .any(|include| !include.is_empty() && file_name.contains(include.as_str()))
    }

    /// Whether any segment of a root-relative path is excluded.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        relative.components().any(|component| match component {
            Component::Normal(segment) => {
                let segment = segment.to_string_lossy();
                self.excludes.iter().any(|exclude| segment == exclude.as_str())
            }
            _ => false,
        })
    }
}
