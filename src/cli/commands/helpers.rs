//! Shared helper functions for command execution.

use crate::cli::{Operation, RuntimeConfig};
use crate::error::ReleaseError;
use crate::pipeline::BuildReport;

/// Human-readable name of an operation
pub(super) fn operation_name(operation: Operation) -> String {
    match operation {
        Operation::Build(kind) => format!("{} build", kind),
        Operation::CopyOnly => "Copy-only".to_string(),
    }
}

/// Print recovery suggestions for a failed operation
pub(super) fn print_suggestions(config: &RuntimeConfig, error: &ReleaseError) {
    let suggestions = error.recovery_suggestions();
    if suggestions.is_empty() {
        return;
    }
    config.println("\n💡 Recovery suggestions:");
    for suggestion in suggestions {
        config.println(&format!("  • {}", suggestion));
    }
}

/// Print the artifact locations and any skipped steps
pub(super) fn print_report(config: &RuntimeConfig, report: &BuildReport) {
    if let Some(version) = &report.version {
        config.indent(&format!("Version:  {}", version));
    }
    if let Some(release_dir) = &report.release_dir {
        config.indent(&format!("Release:  {}", release_dir.display()));
    }
    if let Some(archive) = &report.archive {
        config.indent(&format!(
            "Archive:  {} ({} files, {} bytes)",
            archive.path.display(),
            archive.files,
            archive.size
        ));
        config.indent(&format!("SHA-256:  {}", archive.sha256));
    }
    if let Some(copied) = &report.copied_to {
        config.indent(&format!("Copied:   {}", copied.display()));
    }
    if let Some(sweep) = &report.local_sweep
        && !sweep.deleted.is_empty()
    {
        config.indent(&format!("Removed {} old local release(s)", sweep.deleted.len()));
    }
    if let Some(sweep) = &report.remote_sweep
        && !sweep.deleted.is_empty()
    {
        config.indent(&format!("Removed {} old artifact(s) from the share", sweep.deleted.len()));
    }

    if !report.warnings.is_empty() {
        config.println("");
        for warning in &report.warnings {
            config.warning_println(warning);
        }
    }
}
