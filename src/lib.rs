//! # Shipstamp
//!
//! Build, version-stamp and publish application releases.
//!
//! Each run advances a date-coded version (`YYYY.M.D.REV`), runs the
//! configured packager, assembles a versioned release directory, optionally
//! archives it and copies it to the first reachable network share, then trims
//! old releases locally and on the share.
//!
//! ## Features
//!
//! - **Date-coded versions**: revision counts builds on the same calendar day
//! - **Clean re-publishing**: a release directory is replaced, never merged
//! - **Share fallback**: ordered destination candidates, probed every run
//! - **Best-effort extras**: launcher scripts, copy and retention never fail a build
//!
//! ## Usage
//!
//! ```bash
//! shipstamp --build native              # Build and archive
//! shipstamp --build native --copy       # ... and copy to the share
//! shipstamp --build portable --beta     # Beta build, local destination
//! shipstamp --copy-only                 # Re-publish the latest archive
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod cli;
pub mod config;
pub mod error;
pub mod packager;
pub mod pipeline;
pub mod publish;
pub mod retention;
pub mod share;
pub mod stage;
pub mod utils;
pub mod version;

// Re-export main types for public API
pub use cli::Args;
pub use config::{BuildConfig, ProjectLayout};
pub use error::{CliError, ReleaseError, Result, Severity};
pub use packager::{BuildKind, Packager};
pub use pipeline::{BuildPipeline, BuildReport, PipelineOptions, PipelinePhase};
pub use publish::{ArchiveInfo, PublishedRelease, ReleasePublisher};
pub use retention::{RetentionPolicy, RetentionSweeper, SweepReport};
pub use share::{RemotePathStyle, ShareLocator};
pub use stage::ArtifactStager;
pub use version::{BuildVersion, VersionStore};
