//! Phases of a single build invocation.

use std::fmt;

/// Position of a build in its lifecycle.
///
/// The pipeline moves strictly forward; `Compressed` and `RemoteCopied` are
/// skipped when disabled or, for the copy, when no destination is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelinePhase {
    /// Nothing done yet
    Idle,
    /// Version advanced and written
    VersionComputed,
    /// Packager finished
    Packaged,
    /// Staging area assembled
    Staged,
    /// Versioned release directory written
    Published,
    /// Archive written
    Compressed,
    /// Artifact copied to the destination
    RemoteCopied,
    /// Old releases trimmed
    RetentionSwept,
    /// Finished
    Done,
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelinePhase::Idle => "idle",
            PipelinePhase::VersionComputed => "version computed",
            PipelinePhase::Packaged => "packaged",
            PipelinePhase::Staged => "staged",
            PipelinePhase::Published => "published",
            PipelinePhase::Compressed => "compressed",
            PipelinePhase::RemoteCopied => "remote copied",
            PipelinePhase::RetentionSwept => "retention swept",
            PipelinePhase::Done => "done",
        };
        f.write_str(name)
    }
}
