//! Artifact naming and discovery.
//!
//! Every artifact of a project is named `{project}_v{version}`: release
//! directories carry no extension, archives end in `.zip`.

use crate::error::{PublishError, Result, fs_error};
use crate::utils::fs::modified_time;
use crate::version::BuildVersion;
use std::path::{Path, PathBuf};

/// Extension of release archives
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Which artifacts to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Versioned release directories
    ReleaseDir,
    /// Versioned `.zip` archives
    Archive,
    /// Any file or directory following the naming convention
    Any,
}

/// Name of the versioned release directory
pub fn release_name(project: &str, version: &BuildVersion) -> String {
    format!("{}_v{}", project, version)
}

/// File name of the versioned archive
pub fn archive_name(project: &str, version: &BuildVersion) -> String {
    format!("{}.{}", release_name(project, version), ARCHIVE_EXTENSION)
}

fn pattern_for(project: &str, kind: ArtifactKind) -> Result<glob::Pattern> {
    let prefix = glob::Pattern::escape(project);
    let text = match kind {
        ArtifactKind::Archive => format!("{}_v*.{}", prefix, ARCHIVE_EXTENSION),
        ArtifactKind::ReleaseDir | ArtifactKind::Any => format!("{}_v*", prefix),
    };
    glob::Pattern::new(&text).map_err(|e| {
        PublishError::InvalidPattern {
            pattern: text.clone(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// List artifacts of `project` directly inside `dir`, newest first.
///
/// A missing `dir` yields an empty list.
pub fn list_artifacts(dir: &Path, project: &str, kind: ArtifactKind) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let pattern = pattern_for(project, kind)?;

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(fs_error("listing", dir))? {
        let entry = entry.map_err(fs_error("listing", dir))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }
        let path = entry.path();
        let keep = match kind {
            ArtifactKind::ReleaseDir => path.is_dir(),
            ArtifactKind::Archive => path.is_file(),
            ArtifactKind::Any => true,
        };
        if keep {
            found.push(path);
        }
    }

    sort_newest_first(&mut found, project);
    Ok(found)
}

/// Version encoded in an artifact name of `project`, if any
pub fn version_of(path: &Path, project: &str) -> Option<BuildVersion> {
    let name = path.file_name()?.to_str()?;
    let rest = name.strip_prefix(project)?.strip_prefix("_v")?;
    let rest = rest
        .strip_suffix(ARCHIVE_EXTENSION)
        .and_then(|r| r.strip_suffix('.'))
        .unwrap_or(rest);
    rest.parse().ok()
}

/// Sort by modification time, newest first.
///
/// Ties are broken by the version in the name (higher first), then by name.
/// Names without a parsable version sort after versioned ones.
pub fn sort_newest_first(paths: &mut [PathBuf], project: &str) {
    paths.sort_by(|a, b| {
        let version_key = |p: &Path| version_of(p, project).map(|v| (v.date, v.revision));
        modified_time(b)
            .cmp(&modified_time(a))
            .then_with(|| version_key(b).cmp(&version_key(a)))
            .then_with(|| b.file_name().cmp(&a.file_name()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let v: BuildVersion = "2024.5.1.0".parse().expect("version");
        assert_eq!(release_name("acme", &v), "acme_v2024.5.1.0");
        assert_eq!(archive_name("acme", &v), "acme_v2024.5.1.0.zip");
    }

    #[test]
    fn test_list_artifacts_filters_by_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir(root.join("acme_v2024.5.1.0")).expect("mkdir");
        std::fs::write(root.join("acme_v2024.5.1.0.zip"), "z").expect("write");
        std::fs::create_dir(root.join("temp")).expect("mkdir");
        std::fs::create_dir(root.join("other_v2024.5.1.0")).expect("mkdir");
        std::fs::write(root.join("acme_notes.txt"), "n").expect("write");

        let dirs = list_artifacts(root, "acme", ArtifactKind::ReleaseDir).expect("list");
        assert_eq!(dirs, vec![root.join("acme_v2024.5.1.0")]);

        let archives = list_artifacts(root, "acme", ArtifactKind::Archive).expect("list");
        assert_eq!(archives, vec![root.join("acme_v2024.5.1.0.zip")]);

        let any = list_artifacts(root, "acme", ArtifactKind::Any).expect("list");
        assert_eq!(any.len(), 2);
    }

    #[test]
    fn test_project_name_is_escaped() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("a[1]_v2024.5.1.0")).expect("mkdir");
        let dirs = list_artifacts(dir.path(), "a[1]", ArtifactKind::ReleaseDir).expect("list");
        assert_eq!(dirs.len(), 1);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let listed = list_artifacts(&dir.path().join("absent"), "acme", ArtifactKind::Any).expect("list");
        assert!(listed.is_empty());
    }

    #[test]
    fn test_version_of_reads_dirs_and_archives() {
        let v = version_of(Path::new("/r/acme_v2024.5.1.10.zip"), "acme").expect("archive");
        assert_eq!(v.to_string(), "2024.5.1.10");
        let v = version_of(Path::new("/r/acme_v2024.5.1.3b"), "acme").expect("dir");
        assert!(v.beta);
        assert!(version_of(Path::new("/r/acme_vnext"), "acme").is_none());
        assert!(version_of(Path::new("/r/other_v2024.5.1.0"), "acme").is_none());
    }

    #[test]
    fn test_equal_mtimes_order_by_revision_not_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        let when = std::time::SystemTime::now() - std::time::Duration::from_secs(60);
        for rev in [9, 10, 2] {
            let path = root.join(format!("acme_v2024.5.1.{rev}.zip"));
            std::fs::write(&path, "PK").expect("write");
            std::fs::File::options()
                .write(true)
                .open(&path)
                .and_then(|f| f.set_modified(when))
                .expect("set mtime");
        }

        let archives = list_artifacts(root, "acme", ArtifactKind::Archive).expect("list");
        let names: Vec<_> = archives
            .iter()
            .map(|p| p.file_name().expect("name").to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["acme_v2024.5.1.10.zip", "acme_v2024.5.1.9.zip", "acme_v2024.5.1.2.zip"]
        );
    }
}
