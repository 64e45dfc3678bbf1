//! # fracwatch CLI
//!
//! A command-line tool for analyzing hydraulic-fracturing treatment telemetry.
//!
//! ## Usage
//!
//! ```bash
//! # Detect breakdowns in one export
//! fracwatch detect "WELL A_STG 3.txt"
//!
//! # Learn favorable conditions from a directory of runs, predict on a new one
//! fracwatch predict --train-dir treatments/ "WELL A_STG 9.txt"
//!
//! # Summarize an export
//! fracwatch info "WELL A_STG 3.txt"
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
