//! Build command implementation.

use super::helpers::print_report;
use crate::cli::{Args, RuntimeConfig};
use crate::config::BuildConfig;
use crate::error::Result;
use crate::pipeline::BuildPipeline;

/// Execute a full build
pub(super) async fn execute_build(
    args: &Args,
    build_config: &BuildConfig,
    config: &RuntimeConfig,
) -> Result<i32> {
    let options = args.pipeline_options();
    config.section(&format!("{} ({} build)", build_config.project_name, options.kind));
    if options.beta {
        let _ = config.output().info("Beta build");
    }

    let pipeline = BuildPipeline::new(build_config);
    let report = pipeline.run_full_build(&options).await?;

    if report.warnings.is_empty() {
        config.success_println("Build completed");
    } else {
        config.success_println(&format!(
            "Build completed with {} warning(s)",
            report.warnings.len()
        ));
    }
    print_report(config, &report);
    Ok(0)
}
