//! holdscale CLI - Command-line interface
//!
//! Extracts storage definitions from X4 archives and builds one scaled
//! cargo mod per configured factor.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use holdscale::config::config_file_path;

use commands::common::{BuildArgs, SourceArgs};
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "holdscale")]
#[command(version = holdscale::VERSION)]
#[command(about = "Scale X4 storage module cargo capacity and package the result as mods", long_about = None)]
struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract storage definitions from the game archives and filter them
    Extract {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Build one mod per factor from the extracted definitions
    Build {
        /// Directory holding the filtered definitions
        #[arg(long, value_name = "DIR")]
        extract_dir: Option<PathBuf>,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Extract, then build
    Run {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Write a default configuration file
    Init,

    /// View or modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.unwrap_or_else(config_file_path);

    match cli.command {
        Commands::Extract { source } => commands::extract::run(&config_path, cli.verbose, &source),
        Commands::Build { extract_dir, build } => {
            let source = SourceArgs {
                game_dir: None,
                extract_dir,
            };
            commands::build::run(&config_path, cli.verbose, &source, &build)
        }
        Commands::Run { source, build } => {
            commands::run::run(&config_path, cli.verbose, &source, &build)
        }
        Commands::Init => commands::init::run(&config_path),
        Commands::Config { command } => commands::config::run(&config_path, command),
    }
}
