//! Build command - generate, pack and optionally upload each factor.

use std::path::Path;

use holdscale::pipeline::{BuildReport, Pipeline, SystemTools};

use super::common::{BuildArgs, SourceArgs};
use super::output::print_build_report;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the build command.
pub fn run(
    config_path: &Path,
    verbose: bool,
    source: &SourceArgs,
    build: &BuildArgs,
) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose)?;
    runner.log_startup("build");

    let config = build.apply(source.apply(runner.mod_config()));
    let tools = SystemTools::from_config(&config);
    let report = Pipeline::with_system_tools(config, &tools).build()?;

    print_build_report(&report);
    check_report(&report)
}

/// Turn failed factors into an error.
pub fn check_report(report: &BuildReport) -> Result<(), CliError> {
    let failed: Vec<u32> = report.failed().map(|(factor, _)| factor).collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::FactorsFailed(failed))
    }
}
