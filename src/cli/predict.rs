use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use fracwatch::hausdorff;
use fracwatch::ingest::{read_well_directory, read_well_file};
use fracwatch::predict::FracturePredictor;

use super::{heading, SettingsArgs};

/// Learn favorable conditions from historical runs and predict on a new one
pub fn run(target: PathBuf, train_dir: PathBuf, settings: &SettingsArgs, json: bool) -> Result<()> {
    let settings = settings.resolve()?;

    let training: Vec<_> = read_well_directory(&train_dir)
        .with_context(|| format!("Failed to read training directory {}", train_dir.display()))?
        .into_iter()
        .map(|(dataset, report)| {
            info!("{}: {report}", dataset.name());
            dataset
        })
        .collect();

    let (target_data, target_report) = read_well_file(&target)
        .with_context(|| format!("Failed to read {}", target.display()))?;
    info!("{}: {target_report}", target_data.name());

    let mut predictor = FracturePredictor::new(settings);

    let detections = predictor.detect_all(&training);
    let total_events: usize = detections.values().map(Vec::len).sum();
    info!(
        "detected {total_events} breakdowns across {} training runs",
        training.len()
    );

    let favorable = predictor.learn_favorable_conditions(&training)?.clone();

    let prediction = predictor.apply_to_new_dataset(&target_data)?;

    if json {
        let output = serde_json::json!({
            "favorable_signature": favorable,
            "physics_events": prediction.physics_events,
            "trend_events": prediction.trend_events,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", heading("Favorable Pre-Breakdown Signature"));
    println!("{favorable}");
    println!();

    println!("{}", heading("Predictions"));
    println!("Target: {} ({target_report})", target_data.name());
    print_events("Physics-based", &prediction.physics_events);
    print_events("Trend-based", &prediction.trend_events);

    match hausdorff::distance(&prediction.physics_events, &prediction.trend_events) {
        Ok(gap) => println!("Hausdorff distance between the two detectors: {gap:.1} s"),
        Err(e) => println!("Hausdorff distance unavailable: {e}"),
    }

    Ok(())
}

fn print_events(label: &str, events: &[chrono::NaiveDateTime]) {
    if events.is_empty() {
        println!("{label}: none");
        return;
    }
    println!("{label} ({}):", events.len());
    for event in events {
        println!("  {}", event.format("%Y-%m-%d %H:%M:%S"));
    }
}
