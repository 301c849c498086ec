//! Paths derived from the project root.

use std::path::{Path, PathBuf};

/// Name of the version file in the project root
pub const VERSION_FILE_NAME: &str = "VERSION";

/// Name of the staging directory inside the release directory
pub const STAGING_DIR_NAME: &str = "temp";

/// Filesystem layout of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root directory
    pub project_root: PathBuf,
    /// Directory holding versioned release directories and archives
    pub release_dir: PathBuf,
    /// Scratch directory assembled before publishing
    pub staging_dir: PathBuf,
    /// Packager work directory
    pub work_dir: PathBuf,
    /// Persisted version string
    pub version_file: PathBuf,
}

impl ProjectLayout {
    /// Derive the layout; a relative `release_dir` is resolved against `project_root`
    pub fn new(project_root: &Path, release_dir: &Path) -> Self {
        let release_dir = if release_dir.is_absolute() {
            release_dir.to_path_buf()
        } else {
            project_root.join(release_dir)
        };
        Self {
            project_root: project_root.to_path_buf(),
            staging_dir: release_dir.join(STAGING_DIR_NAME),
            release_dir,
            work_dir: project_root.join("build"),
            version_file: project_root.join(VERSION_FILE_NAME),
        }
    }

    /// Remove any leftover staging directory and recreate the release tree
    pub fn reset_staging(&self) -> std::io::Result<()> {
        if self.staging_dir.exists() {
            std::fs::remove_dir_all(&self.staging_dir)?;
        }
        std::fs::create_dir_all(&self.staging_dir)
    }
}
