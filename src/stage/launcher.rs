//! Launcher script rendering.
//!
//! Launchers run under the Windows command interpreter, which expects CRLF
//! line endings; the files carry a UTF-8 byte order mark so non-ASCII paths
//! survive.

use crate::error::Result;
use crate::utils::template;
use serde::Serialize;

/// Byte order mark prefixed to every launcher
pub const LAUNCHER_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Serialize)]
struct LauncherContext<'a> {
    version: &'a str,
    args: &'a str,
}

/// Render a launcher template into its on-disk bytes
pub fn render_launcher(template: &str, version: &str, args: &str) -> Result<Vec<u8>> {
    let rendered = template::render(template, &LauncherContext { version, args })?;
    let crlf = to_crlf(&rendered);

    let mut bytes = Vec::with_capacity(LAUNCHER_BOM.len() + crlf.len());
    bytes.extend_from_slice(LAUNCHER_BOM);
    bytes.extend_from_slice(crlf.as_bytes());
    Ok(bytes)
}

fn to_crlf(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}
