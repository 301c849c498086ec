//! Byte-level progress bar for long copies.

use linya::{Bar, Progress};
use std::io::IsTerminal;

/// Progress bar that stays silent when stderr is not a terminal
pub struct CopyProgress {
    inner: Option<(Progress, Bar)>,
}

impl CopyProgress {
    /// Create a bar for `total` bytes labelled `label`
    pub fn new(total: u64, label: impl Into<String>, enabled: bool) -> Self {
        let inner = (enabled && std::io::stderr().is_terminal()).then(|| {
            let mut progress = Progress::new();
            let bar = progress.bar(usize::try_from(total).unwrap_or(usize::MAX), label.into());
            (progress, bar)
        });
        Self { inner }
    }

    /// Advance by `bytes`
    pub fn inc(&mut self, bytes: u64) {
        if let Some((progress, bar)) = self.inner.as_mut() {
            progress.inc_and_draw(bar, usize::try_from(bytes).unwrap_or(usize::MAX));
        }
    }
}
