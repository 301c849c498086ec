//! Release publishing: versioned directories and archives.
//!
//! The publisher turns the staging area into an immutable, version-stamped
//! release directory and optionally compresses it. Re-publishing a version
//! replaces the previous directory wholesale.

mod archive;
mod naming;

pub use archive::{ArchiveInfo, sha256_file, zip_directory};
pub use naming::{
    ARCHIVE_EXTENSION, ArtifactKind, archive_name, list_artifacts, release_name, sort_newest_first,
    version_of,
};

use crate::config::BuildConfig;
use crate::error::{Result, fs_error};
use crate::packager::BuildKind;
use crate::stage::ArtifactStager;
use crate::utils::fs::{merge_copy_dir, remove_dir_all};
use crate::version::BuildVersion;
use std::path::{Path, PathBuf};

/// A freshly written release directory
#[derive(Debug, Clone)]
pub struct PublishedRelease {
    /// Versioned release directory
    pub path: PathBuf,
    /// Launcher scripts written into it
    pub launchers: Vec<PathBuf>,
    /// Launcher problems that were skipped
    pub warnings: Vec<String>,
}

/// Materializes release directories and archives
#[derive(Debug, Clone)]
pub struct ReleasePublisher {
    project_name: String,
    project_root: PathBuf,
    release_dir: PathBuf,
    staging_dir: PathBuf,
    native_artifact: String,
    portable_artifact: String,
    launchers_enabled: bool,
    stager: ArtifactStager,
}

impl ReleasePublisher {
    /// Create a publisher for the configured project
    pub fn new(config: &BuildConfig) -> Self {
        let layout = config.layout();
        Self {
            project_name: config.project_name.clone(),
            project_root: layout.project_root,
            release_dir: layout.release_dir,
            staging_dir: layout.staging_dir,
            native_artifact: config.native_artifact_name(),
            portable_artifact: config.portable_artifact.clone(),
            launchers_enabled: true,
            stager: ArtifactStager::new(config),
        }
    }

    /// Enable or disable launcher script creation during [`publish`](Self::publish)
    pub fn with_launchers(mut self, enabled: bool) -> Self {
        self.launchers_enabled = enabled;
        self
    }

    /// Directory holding release directories and archives
    pub fn release_dir(&self) -> &Path {
        &self.release_dir
    }

    /// Rename the packager's default-named output to embed `version`.
    ///
    /// The artifact is looked up in the staging area, then in the project
    /// root. Returns the new path, or `None` with a warning when the packager
    /// left nothing behind.
    pub fn rename_primary_artifact(&self, kind: BuildKind, version: &BuildVersion) -> Result<Option<PathBuf>> {
        let default_name = match kind {
            BuildKind::Native => &self.native_artifact,
            BuildKind::Portable => &self.portable_artifact,
        };

        let Some(found) = [&self.staging_dir, &self.project_root]
            .into_iter()
            .map(|dir| dir.join(default_name))
            .find(|candidate| candidate.is_file())
        else {
            log::warn!(
                "Primary artifact '{}' not found in {}; the packager may have failed",
                default_name,
                self.staging_dir.display()
            );
            return Ok(None);
        };

        let mut versioned = release_name(&self.project_name, version);
        if let Some(ext) = Path::new(default_name).extension() {
            versioned.push('.');
            versioned.push_str(&ext.to_string_lossy());
        }
        let target = self.staging_dir.join(versioned);

        std::fs::create_dir_all(&self.staging_dir).map_err(fs_error("creating", &self.staging_dir))?;
        if std::fs::rename(&found, &target).is_err() {
            // Cross-device moves fall back to copy + delete.
            std::fs::copy(&found, &target).map_err(fs_error("copying", &found))?;
            std::fs::remove_file(&found).map_err(fs_error("removing", &found))?;
        }
        log::info!("Renamed {} -> {}", found.display(), target.display());
        Ok(Some(target))
    }

    /// Versioned release directory for `version`
    pub fn release_path(&self, version: &BuildVersion) -> PathBuf {
        self.release_dir.join(release_name(&self.project_name, version))
    }

    /// Versioned archive path for `version`
    pub fn archive_path(&self, version: &BuildVersion) -> PathBuf {
        self.release_dir.join(archive_name(&self.project_name, version))
    }

    /// Copy `staging_dir` into a fresh versioned release directory.
    ///
    /// An existing directory for the same version is deleted first, so the
    /// result never contains files from an earlier run. Launcher scripts are
    /// rendered into the new directory afterwards; any launcher failure
    /// (missing or malformed template, unwritable file) is logged and returned
    /// as a warning, never as an error.
    pub fn publish(&self, staging_dir: &Path, version: &BuildVersion) -> Result<PublishedRelease> {
        let target = self.release_path(version);
        if target.exists() {
            log::info!("Replacing existing release directory {}", target.display());
            remove_dir_all(&target)?;
        }

        let files = merge_copy_dir(staging_dir, &target)?;
        log::info!("Published {} files to {}", files, target.display());

        let mut published = PublishedRelease {
            path: target,
            launchers: Vec::new(),
            warnings: Vec::new(),
        };
        if self.launchers_enabled {
            match self.stager.create_launch_scripts(&published.path, version) {
                Ok(launchers) => published.launchers = launchers,
                Err(e) => {
                    log::warn!("Skipping launcher scripts: {}", e);
                    published.warnings.push(format!("launcher scripts: {}", e));
                }
            }
        }

        Ok(published)
    }

    /// Compress `release_dir` into `{project}_v{version}.zip` next to it
    pub fn compress(&self, release_dir: &Path, version: &BuildVersion) -> Result<ArchiveInfo> {
        let parent = release_dir.parent().unwrap_or(&self.release_dir);
        let archive_path = parent.join(archive_name(&self.project_name, version));
        log::info!("Compressing {} ...", archive_path.display());
        let info = zip_directory(release_dir, &archive_path)?;
        log::info!("Created archive {} ({} bytes)", info.path.display(), info.size);
        Ok(info)
    }

    /// Most recently modified archive in the release directory
    pub fn latest_archive(&self) -> Result<Option<PathBuf>> {
        let archives = list_artifacts(&self.release_dir, &self.project_name, ArtifactKind::Archive)?;
        Ok(archives.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn setup() -> (tempfile::TempDir, BuildConfig) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = BuildConfig::from_toml("project_name = \"acme\"\nshare_path = \"/share\"\n")
            .expect("config parses");
        config.project_root = dir.path().to_path_buf();
        config.native_artifact = Some("acme.exe".to_string());
        (dir, config)
    }

    fn file_set(dir: &Path) -> BTreeSet<PathBuf> {
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().strip_prefix(dir).expect("prefix").to_path_buf())
            .collect()
    }

    #[test]
    fn test_rename_primary_artifact_embeds_version() {
        let (_dir, config) = setup();
        let staging = config.layout().staging_dir;
        std::fs::create_dir_all(&staging).expect("mkdir");
        std::fs::write(staging.join("acme.exe"), b"MZ").expect("write");
        let publisher = ReleasePublisher::new(&config);
        let version = "2024.5.1.0".parse().expect("version");

        let renamed = publisher
            .rename_primary_artifact(BuildKind::Native, &version)
            .expect("rename")
            .expect("artifact present");

        assert_eq!(renamed, staging.join("acme_v2024.5.1.0.exe"));
        assert!(!staging.join("acme.exe").exists());
    }

    #[test]
    fn test_rename_portable_from_project_root() {
        let (dir, config) = setup();
        std::fs::write(dir.path().join("app.pyz"), b"PK").expect("write");
        let publisher = ReleasePublisher::new(&config);
        let version = "2024.5.1.2b".parse().expect("version");

        let renamed = publisher
            .rename_primary_artifact(BuildKind::Portable, &version)
            .expect("rename")
            .expect("artifact present");

        assert_eq!(renamed, config.layout().staging_dir.join("acme_v2024.5.1.2b.pyz"));
    }

    #[test]
    fn test_rename_missing_artifact_is_none() {
        let (_dir, config) = setup();
        let publisher = ReleasePublisher::new(&config);
        let version = "2024.5.1.0".parse().expect("version");
        let renamed = publisher.rename_primary_artifact(BuildKind::Native, &version).expect("rename");
        assert!(renamed.is_none());
    }

    #[test]
    fn test_publish_twice_replaces_directory() {
        let (_dir, config) = setup();
        let staging = config.layout().staging_dir;
        std::fs::create_dir_all(staging.join("docs")).expect("mkdir");
        std::fs::write(staging.join("acme.exe"), b"MZ").expect("write");
        std::fs::write(staging.join("docs/a.txt"), b"a").expect("write");
        let publisher = ReleasePublisher::new(&config);
        let version = "2024.5.1.0".parse().expect("version");

        let first = publisher.publish(&staging, &version).expect("publish").path;
        let first_files = file_set(&first);
        std::fs::write(first.join("stale.log"), b"partial run").expect("write");

        let second = publisher.publish(&staging, &version).expect("publish").path;

        assert_eq!(first, second);
        assert_eq!(file_set(&second), first_files);
        assert!(!second.join("stale.log").exists());
        assert_eq!(second.file_name().and_then(|n| n.to_str()), Some("acme_v2024.5.1.0"));
    }

    #[test]
    fn test_compress_and_latest_archive() {
        let (_dir, config) = setup();
        let staging = config.layout().staging_dir;
        std::fs::create_dir_all(&staging).expect("mkdir");
        std::fs::write(staging.join("acme.exe"), b"MZ").expect("write");
        let publisher = ReleasePublisher::new(&config);
        let version = "2024.5.1.0".parse().expect("version");

        assert!(publisher.latest_archive().expect("latest").is_none());

        let release = publisher.publish(&staging, &version).expect("publish").path;
        let info = publisher.compress(&release, &version).expect("compress");

        assert_eq!(info.path, publisher.archive_path(&version));
        assert_eq!(publisher.latest_archive().expect("latest"), Some(info.path));
    }

    #[test]
    fn test_broken_launcher_template_only_warns() {
        let (dir, mut config) = setup();
        std::fs::write(dir.path().join("launcher.template"), "run {{#if}}").expect("write");
        config.launchers.scripts.push(crate::config::LauncherScript {
            file_name: "start.bat".to_string(),
            args: String::new(),
        });
        let staging = config.layout().staging_dir;
        std::fs::create_dir_all(&staging).expect("mkdir");
        std::fs::write(staging.join("acme.exe"), b"MZ").expect("write");
        let version = "2024.5.1.0".parse().expect("version");

        let published = ReleasePublisher::new(&config)
            .publish(&staging, &version)
            .expect("publish survives a broken template");

        assert!(published.path.join("acme.exe").is_file());
        assert!(published.launchers.is_empty());
        assert_eq!(published.warnings.len(), 1);
        assert!(published.warnings[0].contains("launcher scripts"));
        assert!(!published.path.join("start.bat").exists());
    }

    #[test]
    fn test_missing_launcher_template_only_warns() {
        let (_dir, mut config) = setup();
        config.launchers.scripts.push(crate::config::LauncherScript {
            file_name: "start.bat".to_string(),
            args: String::new(),
        });
        let staging = config.layout().staging_dir;
        std::fs::create_dir_all(&staging).expect("mkdir");
        let version = "2024.5.1.0".parse().expect("version");

        let published = ReleasePublisher::new(&config)
            .publish(&staging, &version)
            .expect("publish survives a missing template");

        assert_eq!(published.warnings.len(), 1);
    }
}
