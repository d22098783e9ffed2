//! Process-wide exclusive claim on a repository root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

fn held_roots() -> &'static Mutex<HashSet<PathBuf>> {
    static HELD: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    HELD.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Exclusive claim on a repository root, released on drop.
///
/// At most one lease exists per canonical root within the process.
#[derive(Debug)]
pub struct RepositoryLease {
    root: PathBuf,
}

impl RepositoryLease {
    /// Claim a repository root.
    ///
    /// Fails with [`CoreError::RepositoryBusy`] when another lease holds the
    /// same root, and with [`CoreError::RootNotFound`] when the root cannot be
    /// resolved.
    pub fn acquire(root: &Path) -> CoreResult<Self> {
        let canonical = root
            .canonicalize()
            .map_err(|_| CoreError::RootNotFound(root.to_path_buf()))?;

        let mut held = held_roots().lock();
        if !held.insert(canonical.clone()) {
            return Err(CoreError::RepositoryBusy(canonical));
        }
        debug!(root = %canonical.display(), "Acquired repository lease");
        Ok(Self { root: canonical })
    }

    /// The canonical root this lease holds.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for RepositoryLease {
    fn drop(&mut self) {
        held_roots().lock().remove(&self.root);
        debug!(root = %self.root.display(), "Released repository lease");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_lease_on_same_root_is_refused() {
        let temp = tempfile::tempdir().unwrap();
        let lease = RepositoryLease::acquire(temp.path()).unwrap();

        let err = RepositoryLease::acquire(temp.path()).unwrap_err();
        assert!(matches!(err, CoreError::RepositoryBusy(_)));

        // Same directory through a different spelling
        let dotted = temp.path().join(".");
        assert!(RepositoryLease::acquire(&dotted).is_err());

        drop(lease);
        RepositoryLease::acquire(temp.path()).unwrap();
    }

    #[test]
    fn test_distinct_roots_coexist() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let _la = RepositoryLease::acquire(a.path()).unwrap();
        let _lb = RepositoryLease::acquire(b.path()).unwrap();
    }

    #[test]
    fn test_missing_root() {
        let err = RepositoryLease::acquire(Path::new("/no/such/root/here")).unwrap_err();
        assert!(matches!(err, CoreError::RootNotFound(_)));
    }
}
