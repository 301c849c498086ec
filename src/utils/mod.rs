//! Shared filesystem and template helpers.

pub mod fs;
pub mod template;
