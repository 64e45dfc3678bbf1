//! # fracwatch - Breakdown Analysis for Hydraulic-Fracturing Telemetry
//!
//! `fracwatch` analyzes time-series telemetry from hydraulic-fracturing well
//! operations to find "breakdown" events, the moments formation breakdown
//! (the start of induced fracturing) can be inferred from the data, and to
//! learn a reusable pre-breakdown trend signature from historical runs.
//!
//! ## Two independent detectors
//!
//! - **Physics-based** ([`detector`]): a radial-flow permeability estimate is
//!   computed from slurry rate and bottomhole pressure; a sudden relative
//!   increase over its trailing average marks a breakdown.
//! - **Trend-based** ([`predict`]): linear-regression slopes of seven
//!   monitored channels over the seconds preceding historical breakdowns are
//!   averaged into a "favorable" signature; new data is scanned for trailing
//!   windows whose slopes match it.
//!
//! The [`hausdorff`] module quantifies agreement between the two detectors'
//! timestamp sets.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fracwatch::ingest::{read_well_directory, read_well_file};
//! use fracwatch::predict::FracturePredictor;
//! use fracwatch::settings::DetectionSettings;
//! use fracwatch::hausdorff;
//! use std::path::Path;
//!
//! // Load historical runs and the run to predict on.
//! let training: Vec<_> = read_well_directory(Path::new("treatments/"))?
//!     .into_iter()
//!     .map(|(dataset, _report)| dataset)
//!     .collect();
//! let (target, _report) = read_well_file(Path::new("new_stage.txt"))?;
//!
//! // Detect, learn, apply.
//! let mut predictor = FracturePredictor::new(DetectionSettings::default());
//! predictor.detect_all(&training);
//! predictor.learn_favorable_conditions(&training)?;
//! let prediction = predictor.apply_to_new_dataset(&target)?;
//!
//! // How far apart do the two detectors land?
//! let gap = hausdorff::distance(&prediction.physics_events, &prediction.trend_events)?;
//! println!("Hausdorff distance: {gap:.1} s");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`record`]: readings, monitored channels, datasets
//! - [`settings`]: detection tuning parameters and physical constants
//! - [`detector`]: physics-based breakdown detection
//! - [`signature`]: window slope fitting, signature averaging and matching
//! - [`predict`]: the detect → learn → apply pipeline
//! - [`hausdorff`]: discrete Hausdorff distance between timestamp sets
//! - [`ingest`]: tab-delimited telemetry file parsing
//!
//! ## Error model
//!
//! Computational degeneracies (near-zero denominators, short windows,
//! non-positive flow) are steady-state conditions, absorbed locally as skips
//! or undefined slopes. Usage-order violations (applying before learning,
//! Hausdorff over an empty set) surface as typed errors.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod detector;
pub mod hausdorff;
pub mod ingest;
pub mod predict;
pub mod record;
pub mod settings;
pub mod signature;

#[cfg(test)]
pub(crate) mod testutil;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::detector::EventDetector;
    pub use crate::hausdorff::{self, HausdorffError};
    pub use crate::ingest::{read_well_directory, read_well_file, IngestError, ParseReport};
    pub use crate::predict::{FracturePredictor, Prediction, PredictionError, PredictionSession};
    pub use crate::record::{Dataset, MonitoredChannel, WellReading};
    pub use crate::settings::DetectionSettings;
    pub use crate::signature::{
        average_signatures, is_similar, signatures_before_events, slopes_in_window,
        EventSignature, SimilarityTolerance, SlopeSignature,
    };
}
