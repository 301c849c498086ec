//! Copy-only command implementation.
//!
//! Re-publishes the most recent archive without building.

use super::helpers::print_report;
use crate::cli::{Args, RuntimeConfig};
use crate::config::BuildConfig;
use crate::error::Result;
use crate::pipeline::BuildPipeline;

/// Execute copy-only mode
pub(super) fn execute_copy_only(
    args: &Args,
    build_config: &BuildConfig,
    config: &RuntimeConfig,
) -> Result<i32> {
    config.section(&format!("{} (copy only)", build_config.project_name));

    let report = BuildPipeline::new(build_config).run_copy_only(&args.pipeline_options())?;

    config.success_println("Copy completed");
    print_report(config, &report);
    Ok(0)
}
