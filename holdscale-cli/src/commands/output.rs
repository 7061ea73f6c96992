//! Report formatting for pipeline commands.

use console::style;
use holdscale::pipeline::{BuildReport, ExtractReport, FactorReport};
use holdscale::tools::ToolStatus;

/// Print the outcome of the extract phase.
pub fn print_extract_report(report: &ExtractReport) {
    println!("{}", style("Extraction").bold());
    println!("  Archives:    {}", report.extract.archives.len());
    println!("  Definitions: {}", report.filter.kept);
    println!("  Removed:     {}", report.filter.removed);
    println!("  Empty dirs:  {}", report.filter.empty_dirs_removed);

    for status in &report.extract.failures {
        print_tool_warning(status);
    }
}

/// Print one line per factor, followed by any errors.
pub fn print_build_report(report: &BuildReport) {
    println!("{}", style("Build").bold());

    for outcome in &report.factors {
        match &outcome.result {
            Ok(factor) => print_factor(factor),
            Err(e) => println!(
                "  {} x{}: {}",
                style("FAILED").red().bold(),
                outcome.factor,
                e
            ),
        }
    }
}

fn print_factor(report: &FactorReport) {
    println!(
        "  {} x{}: {} patches, version {}, {}",
        style("OK").green().bold(),
        report.factor,
        report.patches,
        report.version.current,
        report.archive.archive_path.display()
    );
    if report.upload.is_some() {
        println!("      uploaded");
    }
    for status in report.tool_failures() {
        print_tool_warning(status);
    }
}

fn print_tool_warning(status: &ToolStatus) {
    let code = status
        .code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    println!(
        "      {} {} exited with {}",
        style("warning:").yellow(),
        status.tool,
        code
    );
    let stderr = status.stderr.trim();
    if !stderr.is_empty() {
        println!("        {}", stderr);
    }
}
