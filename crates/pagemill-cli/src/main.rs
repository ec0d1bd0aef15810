//! pagemill - Select, reorder, rotate and recombine PDF pages.
//!
//! Batch driver for the `pagemill` library: reads input files, applies page
//! transforms from flags and writes a merged PDF or a ZIP archive.

mod cli;
mod config;
mod ops;
mod output;
mod paths;

use clap::Parser;
use log::LevelFilter;
use std::process;

use crate::cli::Cli;
use crate::config::{Config, Task};
use crate::output::OutputFormatter;
use pagemill::PageMillError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.is_quiet(), cli.is_verbose());

    let formatter = OutputFormatter::new(cli.is_quiet(), cli.is_verbose());
    if let Err(err) = run(cli).await {
        formatter.error(&format!("Error: {err:#}"));
        process::exit(exit_code(&err));
    }
}

/// `RUST_LOG` wins; otherwise `-v` shows debug output and `-q` only errors.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);
    log::debug!("Running {:?} on {} input(s)", config.task, config.inputs.len());

    if let Task::Info { .. } = config.task {
        return ops::run_info(&config, &formatter).await;
    }

    print_header(&config, &formatter);
    ops::run_assembly(&config, &formatter).await?;
    Ok(())
}

fn print_header(config: &Config, formatter: &OutputFormatter) {
    if formatter.should_print() && !config.dry_run {
        formatter.info(&format!("{} v{}", pagemill::NAME, pagemill::VERSION));
        formatter.blank_line();
    }
}

/// Library errors carry their own exit code; anything else exits with 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PageMillError>()
        .map_or(1, PageMillError::exit_code)
}
