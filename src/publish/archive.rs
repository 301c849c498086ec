//! ZIP compression of release directories.

use crate::error::{PublishError, ReleaseError, Result, fs_error};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A written archive
#[derive(Debug, Clone)]
pub struct ArchiveInfo {
    /// Archive location
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// SHA-256 of the archive, hex encoded
    pub sha256: String,
    /// Number of file entries
    pub files: usize,
}

/// Zip `source_dir` into `archive_path`.
///
/// Entry names are relative to the parent of `source_dir`, so every entry
/// sits under the source directory's own name. Symbolic links are not
/// followed and are left out of the archive, whether they point at a file,
/// a directory or nothing.
pub fn zip_directory(source_dir: &Path, archive_path: &Path) -> Result<ArchiveInfo> {
    if !source_dir.is_dir() {
        return Err(PublishError::MissingReleaseDir {
            path: source_dir.to_path_buf(),
        }
        .into());
    }
    let base = source_dir.parent().unwrap_or(source_dir);

    let file = File::create(archive_path).map_err(fs_error("creating", archive_path))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0;
    for entry in walkdir::WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry?;
        let name = entry_name(entry.path(), base)?;

        if entry.depth() > 0 && entry.path_is_symlink() {
            log::warn!("Not archiving symbolic link {}", entry.path().display());
            continue;
        }

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else {
            let len = entry.metadata()?.len();
            zip.start_file(name, options.large_file(len >= u32::MAX as u64))?;
            let mut source = File::open(entry.path()).map_err(fs_error("reading", entry.path()))?;
            io::copy(&mut source, &mut zip)?;
            files += 1;
        }
    }
    zip.finish()?;

    let size = std::fs::metadata(archive_path)
        .map_err(fs_error("inspecting", archive_path))?
        .len();
    let sha256 = sha256_file(archive_path)?;
    log::debug!("Archive {} sha256 {}", archive_path.display(), sha256);

    Ok(ArchiveInfo {
        path: archive_path.to_path_buf(),
        size,
        sha256,
        files,
    })
}

/// Archive entry name with forward slashes
fn entry_name(path: &Path, base: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base)
        .map_err(|e| ReleaseError::Io(io::Error::other(e.to_string())))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Hex-encoded SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(fs_error("reading", path))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let n = file.read(&mut buffer).map_err(fs_error("reading", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
