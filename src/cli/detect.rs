use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use fracwatch::detector::EventDetector;
use fracwatch::ingest::read_well_file;

use super::{heading, SettingsArgs};

/// Detect breakdown moments in one telemetry export
pub fn run(input: PathBuf, settings: &SettingsArgs, json: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let settings = settings.resolve()?;

    info!("fracwatch - breakdown detection");
    info!("Input: {}", input.display());
    info!("Reservoir pressure: {} psi", settings.reservoir_pressure);
    info!("Min rate threshold: {} bbl/min", settings.min_rate_threshold);

    let (dataset, report) = read_well_file(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    info!("Parsed {report}");

    let detector = EventDetector::new(settings);
    let events = detector.detect(&dataset);

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    println!("{}", heading("Breakdown Detection"));
    println!("Dataset: {} ({})", dataset.name(), report);
    println!();

    if events.is_empty() {
        println!("No breakdowns detected.");
    } else {
        println!("{} breakdown(s) detected:", events.len());
        for event in &events {
            println!("  {}", event.format("%Y-%m-%d %H:%M:%S"));
        }
    }

    Ok(())
}
