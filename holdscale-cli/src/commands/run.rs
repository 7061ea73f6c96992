//! Run command - extract, then build.

use std::path::Path;

use holdscale::pipeline::{Pipeline, SystemTools};

use super::build::check_report;
use super::common::{BuildArgs, SourceArgs};
use super::output::{print_build_report, print_extract_report};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the full workflow.
pub fn run(
    config_path: &Path,
    verbose: bool,
    source: &SourceArgs,
    build: &BuildArgs,
) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose)?;
    runner.log_startup("run");

    let config = build.apply(source.apply(runner.mod_config()));
    // Fail before touching the extract dir if the build could never run.
    config.validate_for_build()?;

    let tools = SystemTools::from_config(&config);
    let pipeline = Pipeline::with_system_tools(config, &tools);

    let extract = pipeline.extract()?;
    print_extract_report(&extract);
    println!();

    let report = pipeline.build()?;
    print_build_report(&report);
    check_report(&report)
}
