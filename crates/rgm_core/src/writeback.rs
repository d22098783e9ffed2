//! Write-back of generated files to disk and snapshot.
//!
//! [`write_back`] is the only mutation path for both the on-disk working tree
//! and the [`RepositorySnapshot`]. Paths under a `test` or `tests` segment are
//! never written, whatever their case or nesting depth.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::snapshot::RepositorySnapshot;
use crate::types::FileBatch;

/// Segment names that mark a path as belonging to the test suite.
const TEST_SEGMENTS: [&str; 2] = ["test", "tests"];

/// What to do with a generated path that resolves outside the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfBoundsPolicy {
    /// Drop the rest of the batch and restart from an initial test run.
    #[default]
    Restart,
    /// Skip the offending entry and keep writing.
    Skip,
    /// Abort the run.
    Fail,
}

impl OutOfBoundsPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutOfBoundsPolicy::Restart => "restart",
            OutOfBoundsPolicy::Skip => "skip",
            OutOfBoundsPolicy::Fail => "fail",
        }
    }
}

impl std::fmt::Display for OutOfBoundsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutOfBoundsPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "restart" => Ok(OutOfBoundsPolicy::Restart),
            "skip" => Ok(OutOfBoundsPolicy::Skip),
            "fail" => Ok(OutOfBoundsPolicy::Fail),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown out-of-bounds policy '{}' (expected restart, skip or fail)",
                other
            ))),
        }
    }
}

/// Where a generated path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    /// Writable path, relative to the repository root.
    Relative(PathBuf),
    /// Belongs to the test suite; never written.
    TestPath,
    /// Resolves outside the repository root.
    OutOfBounds,
}

/// Summary of one write-back pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    /// Root-relative paths that were written, in batch order
    pub written: Vec<PathBuf>,
    /// Paths dropped because they fall under a test segment
    pub skipped_test_paths: Vec<String>,
    /// Paths that resolved outside the repository root
    pub out_of_bounds: Vec<String>,
    /// Set when an out-of-bounds path stopped the batch under [`OutOfBoundsPolicy::Restart`]
    pub interrupted: bool,
}

impl WriteReport {
    /// One-line description for display output.
    pub fn summary(&self) -> String {
        let mut summary = format!("{} file(s) written", self.written.len());
        if !self.skipped_test_paths.is_empty() {
            summary.push_str(&format!(
                ", {} test path(s) skipped",
                self.skipped_test_paths.len()
            ));
        }
        if !self.out_of_bounds.is_empty() {
            summary.push_str(&format!(
                ", {} path(s) outside the repository",
                self.out_of_bounds.len()
            ));
        }
        summary
    }
}

/// Whether any segment of a path is `test` or `tests`, ignoring case.
///
/// Both separators are honored so that `tests\foo.py` is caught on every
/// platform.
pub fn is_test_path(path: &str) -> bool {
    path.split(['/', '\\'])
        .any(|segment| TEST_SEGMENTS.iter().any(|t| segment.eq_ignore_ascii_case(t)))
}

/// Resolve a generated path against the repository root.
///
/// Relative paths are checked for test segments both as given and after
/// normalization, and must not climb above the root through `..`. Absolute
/// paths must lie under `root` and are checked relative to it, so segments
/// of the root itself never count.
pub fn classify_write_path(root: &Path, raw: &str) -> WriteTarget {
    if raw.trim().is_empty() {
        return WriteTarget::OutOfBounds;
    }

    let path = Path::new(raw);
    let relative = if path.is_absolute() {
        match strip_root(root, path) {
            Some(relative) => relative,
            None => return WriteTarget::OutOfBounds,
        }
    } else {
        if is_test_path(raw) {
            return WriteTarget::TestPath;
        }
        match normalize(path) {
            Some(relative) => relative,
            None => return WriteTarget::OutOfBounds,
        }
    };

    if relative.as_os_str().is_empty() {
        return WriteTarget::OutOfBounds;
    }
    if is_test_path(&relative.to_string_lossy()) {
        return WriteTarget::TestPath;
    }
    WriteTarget::Relative(relative)
}

/// Write a batch of generated files and mirror them into the snapshot.
///
/// Parent directories are created as needed. An existing snapshot entry is
/// updated in place, a new path is appended.
pub fn write_back(
    root: &Path,
    snapshot: &mut RepositorySnapshot,
    batch: &FileBatch,
    policy: OutOfBoundsPolicy,
) -> CoreResult<WriteReport> {
    let mut report = WriteReport::default();

    for (raw, content) in batch {
        match classify_write_path(root, raw) {
            WriteTarget::TestPath => {
                warn!(path = %raw, "Skipping write to test path");
                report.skipped_test_paths.push(raw.clone());
            }
            WriteTarget::OutOfBounds => {
                report.out_of_bounds.push(raw.clone());
                match policy {
                    OutOfBoundsPolicy::Fail => {
                        return Err(CoreError::OutOfBounds(PathBuf::from(raw)));
                    }
                    OutOfBoundsPolicy::Skip => {
                        warn!(path = %raw, "Skipping write outside repository");
                    }
                    OutOfBoundsPolicy::Restart => {
                        warn!(path = %raw, "Write outside repository, discarding remaining files");
                        report.interrupted = true;
                        break;
                    }
                }
            }
            WriteTarget::Relative(relative) => {
                let full = root.join(&relative);
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent).map_err(|e| CoreError::write(parent, e))?;
                }
                fs::write(&full, content).map_err(|e| CoreError::write(&full, e))?;

                let appended = snapshot.upsert(relative.clone(), content.clone());
                debug!(path = %relative.display(), appended, "Wrote file");
                report.written.push(relative);
            }
        }
    }

    info!("{}", report.summary());
    Ok(report)
}

/// Lexically normalize a relative path, rejecting any climb above its start.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => normalized.push(segment),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

/// Lexically normalize an absolute path, rejecting any climb above its root.
fn normalize_absolute(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                normalized.pop();
                depth -= 1;
            }
            Component::Normal(segment) => {
                normalized.push(segment);
                depth += 1;
            }
        }
    }
    Some(normalized)
}

/// Absolute forms of the repository root: lexical and canonical.
fn absolute_roots(root: &Path) -> Vec<PathBuf> {
    let lexical = if root.is_absolute() {
        Some(root.to_path_buf())
    } else {
        std::env::current_dir().ok().map(|cwd| cwd.join(root))
    };

    let mut roots: Vec<PathBuf> = lexical.as_deref().and_then(normalize_absolute).into_iter().collect();
    if let Ok(canonical) = root.canonicalize() {
        roots.push(canonical);
    }
    roots.retain(|r| r.is_absolute());
    roots
}

fn strip_root(root: &Path, absolute: &Path) -> Option<PathBuf> {
    let candidate = normalize_absolute(absolute)?;
    absolute_roots(root)
        .iter()
        .find_map(|r| candidate.strip_prefix(r).ok().map(Path::to_path_buf))
        .filter(|relative| relative.components().all(|c| matches!(c, Component::Normal(_))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SourceFile;

    fn batch(entries: &[(&str, &str)]) -> FileBatch {
        entries
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_is_test_path_any_case_any_depth() {
        assert!(is_test_path("tests/test_calc.py"));
        assert!(is_test_path("src/Tests/helpers.py"));
        assert!(is_test_path("a/b/TEST/c.py"));
        assert!(is_test_path("pkg\\tests\\x.py"));
        assert!(!is_test_path("src/testing/x.py"));
        assert!(!is_test_path("src/test_utils.py"));
    }

    #[test]
    fn test_classify_relative_paths() {
        let root = Path::new("/work/repo");
        assert_eq!(
            classify_write_path(root, "src/calc.py"),
            WriteTarget::Relative(PathBuf::from("src/calc.py"))
        );
        assert_eq!(
            classify_write_path(root, "./src/../calc.py"),
            WriteTarget::Relative(PathBuf::from("calc.py"))
        );
        assert_eq!(classify_write_path(root, "../escape.py"), WriteTarget::OutOfBounds);
        assert_eq!(classify_write_path(root, "."), WriteTarget::OutOfBounds);
        assert_eq!(classify_write_path(root, ""), WriteTarget::OutOfBounds);
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_absolute_paths() {
        let root = Path::new("/work/repo");
        assert_eq!(
            classify_write_path(root, "/work/repo/src/calc.py"),
            WriteTarget::Relative(PathBuf::from("src/calc.py"))
        );
        assert_eq!(
            classify_write_path(root, "/etc/passwd"),
            WriteTarget::OutOfBounds
        );
        assert_eq!(
            classify_write_path(root, "/work/repo/../other/x.py"),
            WriteTarget::OutOfBounds
        );
        assert_eq!(
            classify_write_path(root, "/work/repo/tests/x.py"),
            WriteTarget::TestPath
        );
        assert_eq!(
            classify_write_path(Path::new("/home/test/repo"), "/home/test/repo/src/x.py"),
            WriteTarget::Relative(PathBuf::from("src/x.py"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_absolute_paths_against_relative_root() {
        let root = Path::new(".");
        assert_eq!(
            classify_write_path(root, "/tmp/rgm_escape.py"),
            WriteTarget::OutOfBounds
        );
        assert_eq!(classify_write_path(root, "/"), WriteTarget::OutOfBounds);

        let inside = std::env::current_dir().unwrap().join("src/generated.py");
        assert_eq!(
            classify_write_path(root, inside.to_str().unwrap()),
            WriteTarget::Relative(PathBuf::from("src/generated.py"))
        );
    }

    #[test]
    fn test_write_back_updates_and_appends() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("calc.py"), "old").unwrap();
        let mut snapshot = RepositorySnapshot::from_files([SourceFile::new("calc.py", "old")]);

        let report = write_back(
            root,
            &mut snapshot,
            &batch(&[("calc.py", "new"), ("pkg/util.py", "util")]),
            OutOfBoundsPolicy::Restart,
        )
        .unwrap();

        assert_eq!(report.written.len(), 2);
        assert!(!report.interrupted);
        assert_eq!(fs::read_to_string(root.join("calc.py")).unwrap(), "new");
        assert_eq!(fs::read_to_string(root.join("pkg/util.py")).unwrap(), "util");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(Path::new("calc.py")).unwrap().content, "new");
    }

    #[test]
    fn test_write_back_never_touches_tests() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        let mut snapshot = RepositorySnapshot::new();

        let report = write_back(
            root,
            &mut snapshot,
            &batch(&[("tests/test_calc.py", "x"), ("src/Test/y.py", "y")]),
            OutOfBoundsPolicy::Restart,
        )
        .unwrap();

        assert!(report.written.is_empty());
        assert_eq!(report.skipped_test_paths.len(), 2);
        assert!(snapshot.is_empty());
        assert!(!root.join("tests").exists());
        assert!(!root.join("src").exists());
    }

    #[test]
    fn test_write_back_restart_policy_stops_batch() {
        let temp = tempfile::tempdir().unwrap();
        let mut snapshot = RepositorySnapshot::new();

        // BTreeMap order: "../outside.py" sorts before "a.py"
        let report = write_back(
            temp.path(),
            &mut snapshot,
            &batch(&[("../outside.py", "x"), ("a.py", "a")]),
            OutOfBoundsPolicy::Restart,
        )
        .unwrap();

        assert!(report.interrupted);
        assert!(report.written.is_empty());
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_write_back_skip_policy_continues() {
        let temp = tempfile::tempdir().unwrap();
        let mut snapshot = RepositorySnapshot::new();

        let report = write_back(
            temp.path(),
            &mut snapshot,
            &batch(&[("../outside.py", "x"), ("a.py", "a")]),
            OutOfBoundsPolicy::Skip,
        )
        .unwrap();

        assert!(!report.interrupted);
        assert_eq!(report.out_of_bounds, vec!["../outside.py".to_string()]);
        assert_eq!(report.written, vec![PathBuf::from("a.py")]);
    }

    #[test]
    fn test_write_back_fail_policy_errors() {
        let temp = tempfile::tempdir().unwrap();
        let mut snapshot = RepositorySnapshot::new();

        let err = write_back(
            temp.path(),
            &mut snapshot,
            &batch(&[("../outside.py", "x")]),
            OutOfBoundsPolicy::Fail,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OutOfBounds(_)));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("SKIP".parse::<OutOfBoundsPolicy>().unwrap(), OutOfBoundsPolicy::Skip);
        assert!("bogus".parse::<OutOfBoundsPolicy>().is_err());
        assert_eq!(OutOfBoundsPolicy::default(), OutOfBoundsPolicy::Restart);
    }
}
