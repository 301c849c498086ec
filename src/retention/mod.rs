//! Retention sweeping of old releases.
//!
//! Two policies exist and are kept separate: the local release directory
//! keeps the `n` most recently modified releases, while a remote share keeps
//! only the artifact that was just published.

use crate::error::Result;
use crate::publish::{ArtifactKind, list_artifacts};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which artifacts survive a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep the `n` most recently modified artifacts (local releases)
    KeepNewest(usize),
    /// Keep only the artifact just published (remote share)
    KeepCurrentOnly,
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionPolicy::KeepNewest(n) => write!(f, "keep {} newest", n),
            RetentionPolicy::KeepCurrentOnly => write!(f, "keep current only"),
        }
    }
}

/// Outcome of a sweep; failures are recorded, not raised
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Artifacts left in place
    pub kept: Vec<PathBuf>,
    /// Artifacts removed
    pub deleted: Vec<PathBuf>,
    /// Artifacts that could not be removed, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl SweepReport {
    fn merge(&mut self, other: SweepReport) {
        self.kept.extend(other.kept);
        self.deleted.extend(other.deleted);
        self.failures.extend(other.failures);
    }

    /// Whether every deletion succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Removes one artifact from disk
pub(crate) type Remover = fn(&Path) -> std::io::Result<()>;

/// Deletes old release directories and archives
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    project_name: String,
    release_dir: PathBuf,
    remover: Remover,
}

impl RetentionSweeper {
    /// Create a sweeper for `project_name` artifacts in `release_dir`
    pub fn new(project_name: impl Into<String>, release_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_name: project_name.into(),
            release_dir: release_dir.into(),
            remover: remove,
        }
    }

    /// Replace how artifacts are deleted
    #[cfg(test)]
    pub(crate) fn with_remover(mut self, remover: Remover) -> Self {
        self.remover = remover;
        self
    }

    /// Keep the `keep` newest release directories and, independently, the
    /// `keep` newest archives. Deletion failures are logged and recorded.
    pub fn sweep_releases(&self, keep: usize) -> Result<SweepReport> {
        let policy = RetentionPolicy::KeepNewest(keep);
        let mut report = SweepReport::default();

        for kind in [ArtifactKind::ReleaseDir, ArtifactKind::Archive] {
            let candidates = list_artifacts(&self.release_dir, &self.project_name, kind)?;
            report.merge(apply(candidates, policy, None, self.remover));
        }

        log::info!(
            "Local retention ({}): kept {}, deleted {}",
            policy,
            report.kept.len(),
            report.deleted.len()
        );
        Ok(report)
    }

    /// On the remote share, delete every artifact except `current_artifact`
    /// once more than `keep_if_more_than` artifacts exist.
    pub fn sweep_remote(&self, share_dir: &Path, current_artifact: &Path, keep_if_more_than: usize) -> Result<SweepReport> {
        let candidates = list_artifacts(share_dir, &self.project_name, ArtifactKind::Any)?;
        if candidates.len() <= keep_if_more_than {
            return Ok(SweepReport {
                kept: candidates,
                ..Default::default()
            });
        }

        let current_name = current_artifact.file_name();
        let current = candidates
            .iter()
            .position(|p| p.file_name() == current_name);
        let report = apply(candidates, RetentionPolicy::KeepCurrentOnly, current, self.remover);

        log::info!(
            "Remote retention ({}) on {}: deleted {}",
            RetentionPolicy::KeepCurrentOnly,
            share_dir.display(),
            report.deleted.len()
        );
        Ok(report)
    }
}

/// Apply `policy` to `candidates` (sorted newest first).
///
/// For `KeepCurrentOnly`, `current` is the index of the artifact to keep;
/// when it is absent nothing is deleted.
fn apply(
    candidates: Vec<PathBuf>,
    policy: RetentionPolicy,
    current: Option<usize>,
    remover: Remover,
) -> SweepReport {
    let mut report = SweepReport::default();

    for (index, path) in candidates.into_iter().enumerate() {
        let keep = match policy {
            RetentionPolicy::KeepNewest(n) => index < n,
            RetentionPolicy::KeepCurrentOnly => current.is_none_or(|c| c == index),
        };
        if keep {
            report.kept.push(path);
            continue;
        }

        match remover(&path) {
            Ok(()) => {
                log::info!("Deleted old release {}", path.display());
                report.deleted.push(path);
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", path.display(), e);
                report.failures.push((path, e.to_string()));
            }
        }
    }

    report
}

fn remove(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

/// Fails for revision 1 artifacts, deletes everything else
#[cfg(test)]
pub(crate) fn remove_all_but_rev_one(path: &Path) -> std::io::Result<()> {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    if name.trim_end_matches(".zip").ends_with(".1") {
        return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "file is locked"));
    }
    remove(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn set_mtime(path: &Path, age_secs: u64) {
        let when = SystemTime::now() - Duration::from_secs(age_secs);
        let file = File::open(path).expect("open for mtime");
        file.set_modified(when).expect("set mtime");
    }

    fn make_release(root: &Path, rev: u32, age_secs: u64) -> PathBuf {
        let dir = root.join(format!("acme_v2024.5.1.{rev}"));
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join("acme.exe"), "MZ").expect("write");
        set_mtime(&dir, age_secs);
        dir
    }

    fn make_archive(root: &Path, rev: u32, age_secs: u64) -> PathBuf {
        let path = root.join(format!("acme_v2024.5.1.{rev}.zip"));
        std::fs::write(&path, "PK").expect("write");
        set_mtime(&path, age_secs);
        path
    }

    #[test]
    fn test_keep_two_of_five() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        // rev 4 newest, rev 0 oldest
        let dirs: Vec<PathBuf> = (0..5).map(|rev| make_release(root, rev, 1000 - rev as u64 * 100)).collect();
        let archives: Vec<PathBuf> = (0..5).map(|rev| make_archive(root, rev, 1000 - rev as u64 * 100)).collect();

        let report = RetentionSweeper::new("acme", root).sweep_releases(2).expect("sweep");

        assert_eq!(report.deleted.len(), 6);
        assert!(report.is_clean());
        for rev in 0..3 {
            assert!(!dirs[rev].exists());
            assert!(!archives[rev].exists());
        }
        for rev in 3..5 {
            assert!(dirs[rev].exists());
            assert!(archives[rev].exists());
        }
    }

    #[test]
    fn test_keep_two_of_two_deletes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        make_release(root, 0, 200);
        make_release(root, 1, 100);
        make_archive(root, 0, 200);

        let report = RetentionSweeper::new("acme", root).sweep_releases(2).expect("sweep");

        assert!(report.deleted.is_empty());
        assert_eq!(report.kept.len(), 3);
    }

    #[test]
    fn test_staging_and_foreign_dirs_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("temp")).expect("mkdir");
        std::fs::create_dir_all(root.join("other_v2024.5.1.0")).expect("mkdir");
        make_release(root, 0, 10);

        RetentionSweeper::new("acme", root).sweep_releases(0).expect("sweep");

        assert!(root.join("temp").exists());
        assert!(root.join("other_v2024.5.1.0").exists());
        assert!(!root.join("acme_v2024.5.1.0").exists());
    }

    #[test]
    fn test_remote_keeps_only_current() {
        let dir = tempfile::tempdir().expect("tempdir");
        let share = dir.path();
        let old = make_archive(share, 0, 300);
        let older = make_archive(share, 1, 400);
        // Current artifact is not the newest by mtime on purpose.
        let current = make_archive(share, 2, 500);

        let report = RetentionSweeper::new("acme", "/unused")
            .sweep_remote(share, &current, 1)
            .expect("sweep");

        assert_eq!(report.kept, vec![current.clone()]);
        assert!(current.exists());
        assert!(!old.exists());
        assert!(!older.exists());
    }

    #[test]
    fn test_remote_single_artifact_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let only = make_archive(dir.path(), 0, 10);
        let report = RetentionSweeper::new("acme", "/unused")
            .sweep_remote(dir.path(), &only, 1)
            .expect("sweep");
        assert!(report.deleted.is_empty());
        assert!(only.exists());
    }

    #[test]
    fn test_remote_without_current_deletes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = make_archive(dir.path(), 0, 10);
        let b = make_archive(dir.path(), 1, 20);
        let report = RetentionSweeper::new("acme", "/unused")
            .sweep_remote(dir.path(), Path::new("acme_v2099.1.1.0.zip"), 1)
            .expect("sweep");
        assert!(report.deleted.is_empty());
        assert!(a.exists() && b.exists());
    }

    #[test]
    fn test_undeletable_release_is_recorded_and_others_go() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        let dirs: Vec<PathBuf> = (0..4).map(|rev| make_release(root, rev, 1000 - rev as u64 * 100)).collect();

        let report = RetentionSweeper::new("acme", root)
            .with_remover(remove_all_but_rev_one)
            .sweep_releases(1)
            .expect("sweep");

        assert_eq!(report.failures.len(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].0, dirs[1]);
        assert!(report.failures[0].1.contains("file is locked"));
        assert_eq!(report.deleted.len(), 2);
        assert!(!dirs[0].exists());
        assert!(dirs[1].exists());
        assert!(!dirs[2].exists());
        assert!(dirs[3].exists());
    }
}
