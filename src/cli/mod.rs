//! Command line interface for shipstamp.
//!
//! Parses arguments, loads the project configuration and hands off to the
//! build pipeline, translating the outcome into colored output and an exit code.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Operation, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}

/// Parse arguments without executing (for testing)
pub fn parse_args() -> Args {
    Args::parse_args()
}

/// Create runtime configuration from arguments
pub fn create_runtime_config(args: &Args) -> RuntimeConfig {
    RuntimeConfig::from(args)
}
