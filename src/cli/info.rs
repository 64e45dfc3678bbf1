use anyhow::{Context, Result};
use std::path::PathBuf;

use fracwatch::ingest::read_well_file;

use super::heading;

/// Display information about a telemetry export
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let (dataset, report) = read_well_file(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("{}", heading("Telemetry Export Information"));
    println!("File: {}", file.display());
    println!("Dataset: {}", dataset.name());
    println!();

    println!("Parsing:");
    println!("  {report}");
    println!();

    println!("Readings:");
    println!("  Records: {}", dataset.len());
    match dataset.time_span() {
        Some((first, last)) => {
            let duration = last.signed_duration_since(first).num_milliseconds() as f64 / 1_000.0;
            println!("  First: {}", first.format("%Y-%m-%d %H:%M:%S"));
            println!("  Last:  {}", last.format("%Y-%m-%d %H:%M:%S"));
            println!("  Span:  {duration:.0} s");
            if dataset.len() > 1 {
                println!(
                    "  Mean cadence: {:.2} s",
                    duration / (dataset.len() - 1) as f64
                );
            }
        }
        None => println!("  (no readings)"),
    }

    Ok(())
}
