//! Destination discovery and artifact transfer.
//!
//! Network shares come and go, so the candidate list is probed on every run.
//! An unreachable share is never fatal for a build: callers skip the copy.

mod path_style;
mod progress;

pub use path_style::RemotePathStyle;
pub use progress::CopyProgress;

use crate::config::BuildConfig;
use crate::error::{Result, ShareError};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Chunk size for file copies
const COPY_CHUNK: usize = 4 * 1024 * 1024;

/// Picks the first reachable destination from an ordered candidate list
#[derive(Debug, Clone)]
pub struct ShareLocator {
    candidates: Vec<PathBuf>,
    style: RemotePathStyle,
}

impl ShareLocator {
    /// Create a locator over `candidates`, highest priority first
    pub fn new(candidates: Vec<PathBuf>, style: RemotePathStyle) -> Self {
        Self { candidates, style }
    }

    /// Locator over the configured shares for the current platform
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(config.share_candidates(), RemotePathStyle::current())
    }

    /// Candidates in priority order
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that follows the platform's path syntax and exists as a directory
    pub fn find_available_destination(&self) -> Option<PathBuf> {
        for candidate in &self.candidates {
            if !self.style.matches(candidate) {
                log::debug!(
                    "Skipping {} (not a {:?} path)",
                    candidate.display(),
                    self.style
                );
                continue;
            }
            if candidate.is_dir() {
                log::info!("Using destination {}", candidate.display());
                return Some(candidate.clone());
            }
            log::debug!("Destination {} not reachable", candidate.display());
        }
        None
    }
}

fn copy_failed(source_path: &Path, destination: &Path) -> impl FnOnce(std::io::Error) -> ShareError {
    let source_path = source_path.to_path_buf();
    let destination = destination.to_path_buf();
    move |source| ShareError::CopyFailed {
        source_path,
        destination,
        source,
    }
}

fn copy_with_progress(from: &Path, to: &Path, progress: &mut CopyProgress) -> Result<u64> {
    let mut reader = File::open(from).map_err(copy_failed(from, to))?;
    let mut writer = File::create(to).map_err(copy_failed(from, to))?;
    let mut buffer = vec![0u8; COPY_CHUNK];
    let mut copied = 0u64;

    loop {
        let n = reader.read(&mut buffer).map_err(copy_failed(from, to))?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n]).map_err(copy_failed(from, to))?;
        copied += n as u64;
        progress.inc(n as u64);
    }
    writer.flush().map_err(copy_failed(from, to))?;
    Ok(copied)
}

/// Copy a single artifact file into `dest_dir`, returning the destination path
pub fn copy_to_destination(file: &Path, dest_dir: &Path, show_progress: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(dest_dir).map_err(copy_failed(file, dest_dir))?;
    let name = file.file_name().ok_or_else(|| ShareError::CopyFailed {
        source_path: file.to_path_buf(),
        destination: dest_dir.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "artifact has no file name"),
    })?;
    let destination = dest_dir.join(name);

    let total = std::fs::metadata(file).map_err(copy_failed(file, &destination))?.len();
    let mut progress = CopyProgress::new(total, format!("Copying {}", name.to_string_lossy()), show_progress);
    let copied = copy_with_progress(file, &destination, &mut progress)?;

    log::info!("Copied {} bytes to {}", copied, destination.display());
    Ok(destination)
}

/// Copy a release directory into `dest_dir`, replacing any previous copy
pub fn copy_dir_to_destination(source_dir: &Path, dest_dir: &Path, show_progress: bool) -> Result<PathBuf> {
    let name = source_dir.file_name().ok_or_else(|| ShareError::CopyFailed {
        source_path: source_dir.to_path_buf(),
        destination: dest_dir.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "directory has no name"),
    })?;
    let destination = dest_dir.join(name);

    if destination.exists() {
        log::warn!("Destination {} exists; replacing it", destination.display());
        std::fs::remove_dir_all(&destination).map_err(copy_failed(source_dir, &destination))?;
    }

    let mut files = Vec::new();
    let mut total = 0u64;
    for entry in walkdir::WalkDir::new(source_dir) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
            files.push(entry.into_path());
        }
    }

    let mut progress = CopyProgress::new(total, format!("Copying {}", name.to_string_lossy()), show_progress);
    for file in &files {
        let relative = file
            .strip_prefix(source_dir)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let target = destination.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(copy_failed(file, parent))?;
        }
        copy_with_progress(file, &target, &mut progress)?;
    }

    log::info!("Copied {} files to {}", files.len(), destination.display());
    Ok(destination)
}
