//! Error types for shipstamp operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.
//! Every error is classified as either fatal (the produced artifact would be invalid or
//! missing) or recoverable (only a convenience step is affected).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shipstamp operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// How the pipeline must react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the pipeline and exit non-zero
    Fatal,
    /// Log a warning and continue with the next step
    Recoverable,
}

/// Main error type for all shipstamp operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration loading errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Version store errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// External packager errors
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Staging and publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Destination share errors
    #[error("Share error: {0}")]
    Share(#[from] ShareError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal errors
    #[error("Walk error: {0}")]
    Walkdir(#[from] walkdir::Error),

    /// ZIP archive errors
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Template rendering errors
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Configuration file not found at {path}")]
    NotFound {
        /// Path where the file was expected
        path: PathBuf,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    ReadFailed {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML or misses required keys
    #[error("Invalid configuration file {path}: {source}")]
    Invalid {
        /// Path to the configuration file
        path: PathBuf,
        /// Parsing error
        #[source]
        source: toml::de::Error,
    },

    /// Project root cannot be resolved to an absolute path
    #[error("Cannot resolve project root {path}: {source}")]
    ProjectRoot {
        /// Project root as given
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A required value is present but empty
    #[error("Configuration key '{key}' must not be empty")]
    EmptyValue {
        /// Key name
        key: String,
    },
}

/// Version store errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Version string does not have the `YYYY.M.D.REV` shape
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Version file could not be written
    #[error("Failed to write version file {path}: {source}")]
    WriteFailed {
        /// Path to the version file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// External packager errors
#[derive(Error, Debug)]
pub enum PackageError {
    /// No command configured for the requested build kind
    #[error("No packager command configured for '{kind}' builds")]
    NotConfigured {
        /// Build kind name
        kind: String,
    },

    /// Packager executable could not be resolved
    #[error("Packager program '{program}' not found: {reason}")]
    ProgramNotFound {
        /// Program name
        program: String,
        /// Reason for the error
        reason: String,
    },

    /// Packager process could not be spawned
    #[error("Failed to start packager '{program}': {source}")]
    SpawnFailed {
        /// Program name
        program: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Packager exited with a non-zero status
    #[error("Packager '{program}' exited with {status}")]
    Failed {
        /// Program name
        program: String,
        /// Exit status description
        status: String,
    },
}

/// Staging, publishing and retention errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Filesystem operation failed on a specific path
    #[error("Failed {operation} {path}: {source}")]
    Fs {
        /// Operation that failed (e.g. "copying", "removing")
        operation: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Launcher template missing
    #[error("Launcher template not found at {path}")]
    TemplateMissing {
        /// Expected template path
        path: PathBuf,
    },

    /// No archive exists to re-publish
    #[error("No release archive found in {release_dir}. Run a full build first.")]
    NoPriorBuild {
        /// Release directory that was searched
        release_dir: PathBuf,
    },

    /// Release directory does not exist
    #[error("Release directory not found: {path}")]
    MissingReleaseDir {
        /// Expected release directory
        path: PathBuf,
    },

    /// Glob pattern for artifact names is invalid
    #[error("Invalid artifact pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern text
        pattern: String,
        /// Reason for the error
        reason: String,
    },
}

/// Destination share errors
#[derive(Error, Debug)]
pub enum ShareError {
    /// No candidate destination was reachable
    #[error("None of the configured destinations is reachable: {candidates:?}")]
    NoDestination {
        /// Candidates that were probed
        candidates: Vec<PathBuf>,
    },

    /// Copy to the destination failed
    #[error("Failed to copy {source_path} to {destination}: {source}")]
    CopyFailed {
        /// Artifact being copied
        source_path: PathBuf,
        /// Destination path
        destination: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Home directory unknown, beta destination cannot be derived
    #[error("Cannot determine home directory for the beta destination")]
    NoHomeDir,
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Nothing to do
    #[error("No operation requested. Use --build or --copy-only (see --help).")]
    NoOperation,
}

/// Shorthand for wrapping an IO error with the path it happened on
pub(crate) fn fs_error(
    operation: &'static str,
    path: impl Into<PathBuf>,
) -> impl FnOnce(std::io::Error) -> ReleaseError {
    let path = path.into();
    move |source| {
        ReleaseError::Publish(PublishError::Fs {
            operation,
            path,
            source,
        })
    }
}

impl ReleaseError {
    /// Classify this error for the orchestrator
    pub fn severity(&self) -> Severity {
        match self {
            ReleaseError::Share(_) => Severity::Recoverable,
            ReleaseError::Publish(PublishError::TemplateMissing { .. }) => Severity::Recoverable,
            _ => Severity::Fatal,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.severity() == Severity::Recoverable
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::NotFound { path }) => vec![
                format!("Create {} with 'project_name' and 'share_path' keys", path.display()),
                "Or point at an existing file with --config <path>".to_string(),
            ],
            ReleaseError::Config(ConfigError::Invalid { .. }) => vec![
                "Ensure 'project_name' and 'share_path' are set".to_string(),
                "Check the TOML syntax of the configuration file".to_string(),
            ],
            ReleaseError::Package(PackageError::ProgramNotFound { program, .. }) => vec![
                format!("Install '{}' or add it to PATH", program),
                "Adjust the [packager] section of the configuration file".to_string(),
            ],
            ReleaseError::Package(PackageError::Failed { .. }) => vec![
                "Scroll up for the packager output".to_string(),
                "Re-run the packager command manually to reproduce".to_string(),
            ],
            ReleaseError::Publish(PublishError::NoPriorBuild { .. }) => vec![
                "Run a full build at least once: shipstamp --build native".to_string(),
            ],
            ReleaseError::Share(ShareError::NoDestination { .. }) => vec![
                "Check that the network share is mounted and reachable".to_string(),
                "Set SHIPSTAMP_SHARE_PATH to override the configured share".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_errors_are_recoverable() {
        let err = ReleaseError::Share(ShareError::NoDestination { candidates: vec![] });
        assert!(err.is_recoverable());
        assert_eq!(err.severity(), Severity::Recoverable);
    }

    #[test]
    fn test_packager_failure_is_fatal() {
        let err = ReleaseError::Package(PackageError::Failed {
            program: "pyinstaller".to_string(),
            status: "exit status: 1".to_string(),
        });
        assert_eq!(err.severity(), Severity::Fatal);
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn test_missing_config_suggests_keys() {
        let err = ReleaseError::Config(ConfigError::NotFound {
            path: PathBuf::from("shipstamp.toml"),
        });
        assert!(err.recovery_suggestions()[0].contains("project_name"));
    }
}
