//! Persistence of the version counter.
//!
//! The version file holds a single line and is the only durable state the
//! tool owns. It is read before each build and overwritten afterwards; no
//! history is kept.

use super::BuildVersion;
use crate::error::{Result, VersionError};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Reads and advances the version stored in a plain-text file
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    /// Create a store backed by `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the version file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Advance the stored version using today's local date
    pub fn read_and_advance(&self, beta: bool) -> Result<BuildVersion> {
        self.read_and_advance_on(chrono::Local::now().date_naive(), beta)
    }

    /// Advance the stored version as if building on `today`.
    ///
    /// A missing, empty or malformed file counts as "no prior version" and
    /// yields revision 0. The result is written back before it is returned.
    pub fn read_and_advance_on(&self, today: NaiveDate, beta: bool) -> Result<BuildVersion> {
        let next = match self.current() {
            Some(previous) => previous.next_on(today),
            None => BuildVersion::first_of(today),
        }
        .with_beta(beta);

        self.write(&next)?;
        log::info!("Version updated to {}", next);
        Ok(next)
    }

    /// Stored version, if the file exists and parses
    pub fn current(&self) -> Option<BuildVersion> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Cannot read {}: {}; starting fresh", self.path.display(), e);
                return None;
            }
        };

        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        match content.parse::<BuildVersion>() {
            Ok(version) => Some(version),
            Err(e) => {
                log::warn!(
                    "Version file {} is malformed ({}); starting from today's date",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Overwrite the version file
    pub fn write(&self, version: &BuildVersion) -> Result<()> {
        std::fs::write(&self.path, version.to_string()).map_err(|source| {
            VersionError::WriteFailed {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }
}
