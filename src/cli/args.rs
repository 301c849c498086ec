//! Command line argument parsing and validation.
//!
//! One invocation performs one operation: a full build (`--build`) or a
//! re-publish of the latest archive (`--copy-only`).

use crate::error::CliError;
use crate::packager::BuildKind;
use crate::pipeline::PipelineOptions;
use clap::Parser;
use std::path::PathBuf;

/// Build, version-stamp and publish application releases
#[derive(Parser, Debug)]
#[command(
    name = "shipstamp",
    version,
    about = "Build, version-stamp and publish application releases",
    long_about = "Package a project with its configured packager, stamp the result with a
date-coded version, archive it and copy it to a network share.

Usage:
  shipstamp --build native
  shipstamp --build native --copy
  shipstamp --build portable --copy --beta
  shipstamp --copy-only"
)]
pub struct Args {
    /// Build kind to produce
    #[arg(long, value_enum, value_name = "KIND")]
    pub build: Option<BuildKind>,

    /// Copy the artifact to the share after building
    #[arg(long)]
    pub copy: bool,

    /// Beta build: version marker and local beta destination
    #[arg(long)]
    pub beta: bool,

    /// Skip building and copy the most recent archive
    #[arg(long)]
    pub copy_only: bool,

    /// Do not create a zip archive; copy the release directory instead
    #[arg(long)]
    pub no_zip: bool,

    /// Reuse the stored version instead of advancing it
    #[arg(long)]
    pub same_version: bool,

    /// Do not render launcher scripts
    #[arg(long)]
    pub no_launchers: bool,

    /// Do not draw progress bars while copying
    #[arg(long)]
    pub no_progress: bool,

    /// Project root containing the configuration and VERSION file
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub project_root: PathBuf,

    /// Configuration file (default: <project-root>/shipstamp.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Operation selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Full build of the given kind
    Build(BuildKind),
    /// Re-publish the latest archive
    CopyOnly,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The single operation this invocation performs.
    ///
    /// Conflicting or missing operation flags are rejected here.
    pub fn operation(&self) -> Result<Operation, CliError> {
        match (self.build, self.copy_only) {
            (Some(_), true) => Err(CliError::InvalidArguments {
                reason: "--copy-only cannot be combined with --build".to_string(),
            }),
            (Some(kind), false) => Ok(Operation::Build(kind)),
            (None, true) if self.no_zip => Err(CliError::InvalidArguments {
                reason: "--copy-only re-publishes an archive and cannot be combined with --no-zip"
                    .to_string(),
            }),
            (None, true) => Ok(Operation::CopyOnly),
            (None, false) => Err(CliError::NoOperation),
        }
    }

    /// Pipeline switches derived from the flags
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            kind: self.build.unwrap_or(BuildKind::Native),
            copy: self.copy || self.copy_only,
            beta: self.beta,
            compress: !self.no_zip,
            same_version: self.same_version,
            launchers: !self.no_launchers,
            show_progress: !self.no_progress && !self.quiet,
            today: None,
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}
