//! Command execution: configuration loading, pipeline dispatch and reporting.

mod build;
mod copy_only;
mod helpers;

use crate::cli::{Args, Operation, RuntimeConfig};
use crate::config::BuildConfig;
use crate::error::Result;

use build::execute_build;
use copy_only::execute_copy_only;

/// Execute the operation selected by `args` and return the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let config = RuntimeConfig::from(&args);

    let operation = match args.operation() {
        Ok(operation) => operation,
        Err(e) => {
            config.error_println(&e.to_string());
            return Ok(1);
        }
    };

    let build_config = match BuildConfig::load(&args.project_root, args.config.as_deref()) {
        Ok(build_config) => build_config,
        Err(e) => {
            config.error_println(&format!("Cannot load configuration: {}", e));
            helpers::print_suggestions(&config, &e);
            return Ok(1);
        }
    };

    let result = match operation {
        Operation::Build(_) => execute_build(&args, &build_config, &config).await,
        Operation::CopyOnly => execute_copy_only(&args, &build_config, &config),
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!("{} failed: {}", helpers::operation_name(operation), e));
            helpers::print_suggestions(&config, &e);
            Ok(1)
        }
    }
}
