//! Staging of auxiliary content next to the packaged output.
//!
//! The staging area is a scratch directory that the packager writes into and
//! that is later copied wholesale into a versioned release directory. This
//! module merges auxiliary directories into it, normalizes names and seeds
//! files the released program expects to find.

mod launcher;

pub use launcher::{LAUNCHER_BOM, render_launcher};

use crate::config::{BuildConfig, LauncherConfig, StageConfig};
use crate::error::{Result, fs_error};
use crate::utils::fs::{merge_copy_dir, remove_dir_all};
use crate::version::BuildVersion;
use std::path::{Path, PathBuf};

/// Outcome of [`ArtifactStager::stage`]
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// Directories merged into the staging area
    pub copied_dirs: Vec<PathBuf>,
    /// Directories skipped (missing, or native-only during a portable build)
    pub skipped_dirs: Vec<PathBuf>,
    /// Number of files copied
    pub files_copied: usize,
}

/// Assembles the staging area
#[derive(Debug, Clone)]
pub struct ArtifactStager {
    project_root: PathBuf,
    staging_dir: PathBuf,
    rules: StageConfig,
    launchers: LauncherConfig,
}

impl ArtifactStager {
    /// Create a stager for the configured project
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            project_root: config.project_root.clone(),
            staging_dir: config.layout().staging_dir,
            rules: config.stage.clone(),
            launchers: config.launchers.clone(),
        }
    }

    /// Staging directory this stager writes into
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Merge auxiliary directories into the staging area.
    ///
    /// With `use_alternate_packaging`, directories marked `native_only` are
    /// skipped since the portable artifact carries them itself. Missing source
    /// directories are skipped silently.
    pub fn stage(&self, use_alternate_packaging: bool) -> Result<StageReport> {
        let mut report = StageReport::default();
        std::fs::create_dir_all(&self.staging_dir).map_err(fs_error("creating", &self.staging_dir))?;

        for dir in &self.rules.dirs {
            let source = self.project_root.join(&dir.source);
            if use_alternate_packaging && dir.native_only {
                log::debug!("Skipping {} for portable build", source.display());
                report.skipped_dirs.push(source);
                continue;
            }
            if !source.is_dir() {
                log::debug!("Auxiliary directory {} not present, skipping", source.display());
                report.skipped_dirs.push(source);
                continue;
            }

            let name = source.file_name().map(PathBuf::from).unwrap_or_else(|| dir.source.clone());
            let files = merge_copy_dir(&source, &self.staging_dir.join(name))?;
            log::info!("Staged {} ({} files)", source.display(), files);
            report.files_copied += files;
            report.copied_dirs.push(source);
        }

        self.apply_renames()?;
        self.seed_files()?;
        Ok(report)
    }

    fn apply_renames(&self) -> Result<()> {
        for rename in &self.rules.renames {
            let from = self.staging_dir.join(&rename.from);
            let to = self.staging_dir.join(&rename.to);
            if !from.exists() {
                continue;
            }

            if from.is_dir() && to.is_dir() {
                merge_copy_dir(&from, &to)?;
                remove_dir_all(&from)?;
            } else {
                if let Some(parent) = to.parent() {
                    std::fs::create_dir_all(parent).map_err(fs_error("creating", parent))?;
                }
                std::fs::rename(&from, &to).map_err(fs_error("renaming", &from))?;
            }
            log::debug!("Renamed {} -> {}", rename.from.display(), rename.to.display());
        }
        Ok(())
    }

    fn seed_files(&self) -> Result<()> {
        for seed in &self.rules.seed_files {
            let target = self.staging_dir.join(&seed.to);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(fs_error("creating", parent))?;
            }

            let staged = seed.from.as_ref().map(|from| self.staging_dir.join(from));
            match staged {
                Some(source) if source.is_file() => {
                    std::fs::rename(&source, &target).map_err(fs_error("moving", &source))?;
                    log::debug!("Moved {} -> {}", source.display(), target.display());
                }
                _ if target.exists() => {}
                _ => {
                    std::fs::write(&target, &seed.default_content)
                        .map_err(fs_error("writing", &target))?;
                    log::debug!("Seeded {} with default content", target.display());
                }
            }
        }
        Ok(())
    }

    /// Render every configured launcher into `target_dir`.
    ///
    /// Returns a recoverable `TemplateMissing` error when launchers are
    /// configured but the template file does not exist.
    pub fn create_launch_scripts(&self, target_dir: &Path, version: &BuildVersion) -> Result<Vec<PathBuf>> {
        if self.launchers.scripts.is_empty() {
            return Ok(Vec::new());
        }

        let template_path = self.project_root.join(&self.launchers.template);
        let template = match std::fs::read_to_string(&template_path) {
            Ok(template) => template,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(crate::error::PublishError::TemplateMissing {
                    path: template_path,
                }
                .into());
            }
            Err(e) => return Err(fs_error("reading", &template_path)(e)),
        };

        let version = version.to_string();
        let mut written = Vec::with_capacity(self.launchers.scripts.len());
        for script in &self.launchers.scripts {
            let bytes = render_launcher(&template, &version, &script.args)?;
            let path = target_dir.join(&script.file_name);
            std::fs::write(&path, bytes).map_err(fs_error("writing", &path))?;
            log::info!("Created launcher {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LauncherScript, SeedFile, StageDir, StageRename};

    fn config(root: &Path) -> BuildConfig {
        let mut config = BuildConfig::from_toml("project_name = \"acme\"\nshare_path = \"/share\"\n")
            .expect("config parses");
        config.project_root = root.to_path_buf();
        config
    }

    #[test]
    fn test_stage_merges_and_skips_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("docs")).expect("mkdir");
        std::fs::write(root.join("docs/readme.txt"), "hi").expect("write");

        let mut config = config(root);
        config.stage.dirs = vec![
            StageDir { source: "docs".into(), native_only: false },
            StageDir { source: "absent".into(), native_only: false },
        ];
        let stager = ArtifactStager::new(&config);
        std::fs::create_dir_all(stager.staging_dir().join("docs")).expect("mkdir");
        std::fs::write(stager.staging_dir().join("docs/extra.txt"), "x").expect("write");

        let report = stager.stage(false).expect("stage");

        assert_eq!(report.copied_dirs, vec![root.join("docs")]);
        assert_eq!(report.skipped_dirs, vec![root.join("absent")]);
        assert!(stager.staging_dir().join("docs/readme.txt").is_file());
        assert!(stager.staging_dir().join("docs/extra.txt").is_file());
    }

    #[test]
    fn test_portable_build_skips_native_only_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("browser")).expect("mkdir");
        std::fs::write(root.join("browser/chrome"), "bin").expect("write");

        let mut config = config(root);
        config.stage.dirs = vec![StageDir { source: "browser".into(), native_only: true }];
        let stager = ArtifactStager::new(&config);

        stager.stage(true).expect("stage");
        assert!(!stager.staging_dir().join("browser").exists());

        stager.stage(false).expect("stage");
        assert!(stager.staging_dir().join("browser/chrome").is_file());
    }

    #[test]
    fn test_renames_and_seed_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("runtime_bin")).expect("mkdir");
        std::fs::write(root.join("runtime_bin/tool"), "t").expect("write");

        let mut config = config(root);
        config.stage.dirs = vec![StageDir { source: "runtime_bin".into(), native_only: false }];
        config.stage.renames = vec![StageRename { from: "runtime_bin".into(), to: "BIN".into() }];
        config.stage.seed_files = vec![SeedFile {
            from: Some("docs/env.txt".into()),
            to: "results/env.txt".into(),
            default_content: "count:0\n".to_string(),
        }];
        let stager = ArtifactStager::new(&config);

        stager.stage(false).expect("stage");

        let staging = stager.staging_dir();
        assert!(!staging.join("runtime_bin").exists());
        assert!(staging.join("BIN/tool").is_file());
        assert_eq!(
            std::fs::read_to_string(staging.join("results/env.txt")).expect("read"),
            "count:0\n"
        );
    }

    #[test]
    fn test_seed_file_moves_staged_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("docs")).expect("mkdir");
        std::fs::write(root.join("docs/env.txt"), "custom").expect("write");

        let mut config = config(root);
        config.stage.dirs = vec![StageDir { source: "docs".into(), native_only: false }];
        config.stage.seed_files = vec![SeedFile {
            from: Some("docs/env.txt".into()),
            to: "results/env.txt".into(),
            default_content: String::new(),
        }];
        let stager = ArtifactStager::new(&config);

        stager.stage(false).expect("stage");

        let staging = stager.staging_dir();
        assert!(!staging.join("docs/env.txt").exists());
        assert_eq!(std::fs::read_to_string(staging.join("results/env.txt")).expect("read"), "custom");
    }

    #[test]
    fn test_launch_scripts_missing_template_is_recoverable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config(dir.path());
        config.launchers.scripts = vec![LauncherScript { file_name: "start.bat".into(), args: String::new() }];
        let stager = ArtifactStager::new(&config);
        let version = "2024.5.1.0".parse().expect("version");

        let err = stager.create_launch_scripts(dir.path(), &version).expect_err("no template");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_launch_scripts_are_rendered() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        std::fs::write(root.join("launcher.template"), "@echo off\nacme.exe {{args}}\nrem {{version}}\n")
            .expect("write template");
        let mut config = config(root);
        config.launchers.scripts = vec![
            LauncherScript { file_name: "start.bat".into(), args: "--fast".into() },
            LauncherScript { file_name: "config.bat".into(), args: "--configure".into() },
        ];
        let stager = ArtifactStager::new(&config);
        let target = root.join("out");
        std::fs::create_dir_all(&target).expect("mkdir");
        let version = "2024.5.1.3".parse().expect("version");

        let written = stager.create_launch_scripts(&target, &version).expect("render");

        assert_eq!(written.len(), 2);
        let bytes = std::fs::read(target.join("start.bat")).expect("read");
        assert!(bytes.starts_with(LAUNCHER_BOM));
        let text = String::from_utf8(bytes[LAUNCHER_BOM.len()..].to_vec()).expect("utf8");
        assert_eq!(text, "@echo off\r\nacme.exe --fast\r\nrem 2024.5.1.3\r\n");
    }
}
