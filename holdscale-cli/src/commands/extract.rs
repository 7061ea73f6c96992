//! Extract command - unpack and filter storage definitions.

use std::path::Path;

use holdscale::pipeline::{Pipeline, SystemTools};

use super::common::SourceArgs;
use super::output::print_extract_report;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the extract command.
pub fn run(config_path: &Path, verbose: bool, source: &SourceArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose)?;
    runner.log_startup("extract");

    let config = source.apply(runner.mod_config());
    let tools = SystemTools::from_config(&config);
    let report = Pipeline::with_system_tools(config, &tools).extract()?;

    print_extract_report(&report);
    Ok(())
}
