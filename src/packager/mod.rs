//! External packager invocation.
//!
//! The packager is an opaque program that turns the project into a native
//! executable or a portable archive and writes it into the staging area. It
//! is awaited to completion; a non-zero exit aborts the build.

use crate::config::{BuildConfig, PackagerConfig, ProjectLayout};
use crate::error::{PackageError, Result};
use crate::utils::template;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tokio::process::Command;

/// Packaging mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BuildKind {
    /// Single native executable
    Native,
    /// Self-contained portable archive
    Portable,
}

impl BuildKind {
    /// Whether this is the alternate (self-contained) packaging mode
    pub fn is_alternate(self) -> bool {
        matches!(self, BuildKind::Portable)
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildKind::Native => write!(f, "native"),
            BuildKind::Portable => write!(f, "portable"),
        }
    }
}

#[derive(Serialize)]
struct CommandContext {
    project: String,
    staging_dir: String,
    work_dir: String,
    project_root: String,
}

/// Runs the configured packager command
#[derive(Debug, Clone)]
pub struct Packager {
    commands: PackagerConfig,
    project_name: String,
    layout: ProjectLayout,
}

impl Packager {
    /// Create a packager for the configured project
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            commands: config.packager.clone(),
            project_name: config.project_name.clone(),
            layout: config.layout(),
        }
    }

    /// Program and rendered arguments for `kind`
    pub fn command_line(&self, kind: BuildKind) -> Result<(String, Vec<String>)> {
        let raw = match kind {
            BuildKind::Native => &self.commands.native,
            BuildKind::Portable => &self.commands.portable,
        };
        let Some((program, args)) = raw.split_first() else {
            return Err(PackageError::NotConfigured {
                kind: kind.to_string(),
            }
            .into());
        };

        let context = CommandContext {
            project: self.project_name.clone(),
            staging_dir: self.layout.staging_dir.display().to_string(),
            work_dir: self.layout.work_dir.display().to_string(),
            project_root: self.layout.project_root.display().to_string(),
        };
        let program = template::render(program, &context)?;
        let args = args
            .iter()
            .map(|arg| template::render(arg, &context))
            .collect::<Result<Vec<_>>>()?;
        Ok((program, args))
    }

    fn resolve_program(&self, program: &str) -> Result<PathBuf> {
        which::which_in(program, std::env::var_os("PATH"), &self.layout.project_root).map_err(|e| {
            PackageError::ProgramNotFound {
                program: program.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Run the packager for `kind` and wait for it to finish
    pub async fn build(&self, kind: BuildKind) -> Result<()> {
        let (program, args) = self.command_line(kind)?;
        let resolved = self.resolve_program(&program)?;
        log::info!("Packaging ({}): {} {}", kind, resolved.display(), args.join(" "));

        let status = Command::new(&resolved)
            .args(&args)
            .current_dir(&self.layout.project_root)
            .status()
            .await
            .map_err(|source| PackageError::SpawnFailed {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PackageError::Failed {
                program,
                status: status.to_string(),
            }
            .into());
        }

        log::info!("Packager finished successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    fn packager(native: &[&str], portable: &[&str]) -> (tempfile::TempDir, Packager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = BuildConfig::from_toml("project_name = \"acme\"\nshare_path = \"/share\"\n")
            .expect("config parses");
        config.project_root = dir.path().to_path_buf();
        config.packager.native = native.iter().map(|s| s.to_string()).collect();
        config.packager.portable = portable.iter().map(|s| s.to_string()).collect();
        (dir, Packager::new(&config))
    }

    #[test]
    fn test_command_line_renders_placeholders() {
        let (dir, packager) = packager(&["pyinstaller", "--distpath", "{{staging_dir}}", "{{project}}.spec"], &[]);
        let (program, args) = packager.command_line(BuildKind::Native).expect("command");
        assert_eq!(program, "pyinstaller");
        assert_eq!(args[1], dir.path().join("releases").join("temp").display().to_string());
        assert_eq!(args[2], "acme.spec");
    }

    #[test]
    fn test_unconfigured_kind_is_fatal() {
        let (_dir, packager) = packager(&["true"], &[]);
        let err = packager.command_line(BuildKind::Portable).expect_err("not configured");
        assert!(matches!(err, ReleaseError::Package(PackageError::NotConfigured { .. })));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let (_dir, packager) = packager(&["definitely-not-a-real-packager-binary"], &[]);
        let err = packager.build(BuildKind::Native).await.expect_err("missing program");
        assert!(matches!(err, ReleaseError::Package(PackageError::ProgramNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_decides_success() {
        let (_dir, ok) = packager(&["true"], &["false"]);
        ok.build(BuildKind::Native).await.expect("true succeeds");
        let err = ok.build(BuildKind::Portable).await.expect_err("false fails");
        assert!(matches!(err, ReleaseError::Package(PackageError::Failed { .. })));
    }
}
