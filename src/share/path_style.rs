//! Remote path conventions per platform.

use std::path::Path;

/// Syntax a destination path must follow on the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemotePathStyle {
    /// `\\server\share\...` network paths (Windows)
    Unc,
    /// Absolute paths such as mount points (Unix)
    Posix,
}

impl RemotePathStyle {
    /// Convention of the platform this binary runs on
    pub fn current() -> Self {
        if cfg!(windows) { Self::Unc } else { Self::Posix }
    }

    /// Whether `path` follows this convention
    pub fn matches(self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        match self {
            Self::Unc => is_unc(&text),
            Self::Posix => text.starts_with('/') && !text.starts_with("//"),
        }
    }
}

/// `\\server\share` with both components present
fn is_unc(text: &str) -> bool {
    let Some(rest) = text.strip_prefix(r"\\").or_else(|| text.strip_prefix("//")) else {
        return false;
    };
    let mut parts = rest.split(['\\', '/']);
    let server = parts.next().unwrap_or_default();
    let share = parts.next().unwrap_or_default();
    !server.is_empty() && !share.is_empty() && server != "?" && server != "."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unc_paths() {
        let style = RemotePathStyle::Unc;
        assert!(style.matches(Path::new(r"\\fileserver\releases")));
        assert!(style.matches(Path::new(r"\\fileserver\releases\acme")));
        assert!(style.matches(Path::new("//fileserver/releases")));
        assert!(!style.matches(Path::new(r"\\fileserver")));
        assert!(!style.matches(Path::new(r"\\?\C:\releases")));
        assert!(!style.matches(Path::new(r"C:\releases")));
        assert!(!style.matches(Path::new("/mnt/releases")));
    }

    #[test]
    fn test_posix_paths() {
        let style = RemotePathStyle::Posix;
        assert!(style.matches(Path::new("/mnt/releases")));
        assert!(!style.matches(Path::new(r"\\fileserver\releases")));
        assert!(!style.matches(Path::new("//fileserver/releases")));
        assert!(!style.matches(Path::new("relative/releases")));
    }
}
