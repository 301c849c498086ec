//! File system utilities for staging and publishing.
//!
//! Provides merge-copies with automatic directory creation, symlink
//! preservation, and path-annotated errors.

use crate::error::{PublishError, ReleaseError, Result, fs_error};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Removes the directory and its contents if it exists.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(fs_error("removing", path))?;
    }
    Ok(())
}

/// Recursively copies `from` into `to`, overlaying existing content.
///
/// Files already present in `to` are overwritten, files only present in `to`
/// are left alone. Symlinks are recreated rather than followed. Returns the
/// number of regular files copied.
pub fn merge_copy_dir(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Err(ReleaseError::Publish(PublishError::Fs {
            operation: "copying",
            path: from.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        }));
    }
    std::fs::create_dir_all(to).map_err(fs_error("creating", to))?;

    let mut copied = 0;
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry?;
        debug_assert!(entry.path().starts_with(from));
        let rel_path = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = std::fs::read_link(entry.path())
                .map_err(fs_error("reading link", entry.path()))?;
            if dest_path.symlink_metadata().is_ok() {
                std::fs::remove_file(&dest_path).map_err(fs_error("replacing", &dest_path))?;
            }
            let linked = if entry.path().is_dir() {
                symlink_dir(&target, &dest_path)
            } else {
                symlink_file(&target, &dest_path)
            };
            linked.map_err(fs_error("linking", &dest_path))?;
        } else if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest_path).map_err(fs_error("creating", &dest_path))?;
        } else {
            std::fs::copy(entry.path(), &dest_path).map_err(fs_error("copying", entry.path()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Last modification time, or the Unix epoch when unavailable.
pub fn modified_time(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
