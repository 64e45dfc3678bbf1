//! Breakdown prediction orchestration.
//!
//! Ties the physics detector and the signature analyzer together: detect
//! breakdowns across a training collection, learn the averaged favorable
//! pre-breakdown signature, then apply it to a new dataset to produce a
//! second, trend-based set of predicted breakdown times alongside the direct
//! physics detections.
//!
//! The operations form a pipeline (detect → learn → apply). All cross-call
//! state lives in an immutable [`PredictionSession`] value that is replaced
//! wholesale by each mutating operation, so concurrent readers never observe a
//! half-updated session, and calling an operation out of order surfaces a
//! typed [`PredictionError`].

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use log::{debug, info};
use rayon::prelude::*;

use crate::detector::EventDetector;
use crate::record::Dataset;
use crate::settings::DetectionSettings;
use crate::signature::{
    average_signatures, is_similar, signatures_before_events, slopes_in_window, SimilarityTolerance,
    SlopeSignature,
};

/// Lookback window for learning pre-breakdown signatures, seconds.
pub const PRE_BREAKDOWN_WINDOW_SECS: i64 = 30;

/// Trailing window tested against the favorable signature, seconds.
pub const TREND_WINDOW_SECS: i64 = 60;

/// Offset from a matching window to the emitted trend prediction, seconds.
pub const TREND_OFFSET_SECS: i64 = 30;

/// Errors from out-of-order pipeline use.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    /// `learn_favorable_conditions` was called before any of the given
    /// datasets had been analyzed by `detect_all`.
    #[error("datasets not yet analyzed: run detect_all before learning favorable conditions")]
    NotYetAnalyzed,
    /// `apply_to_new_dataset` was called before a favorable signature was
    /// learned.
    #[error("favorable conditions have not been learned yet")]
    FavorableNotLearned,
}

/// Immutable snapshot of the orchestrator's cross-call state.
#[derive(Debug, Clone, Default)]
pub struct PredictionSession {
    detections: BTreeMap<String, Vec<NaiveDateTime>>,
    favorable: Option<SlopeSignature>,
}

impl PredictionSession {
    /// Detected breakdowns per dataset name.
    pub fn detections(&self) -> &BTreeMap<String, Vec<NaiveDateTime>> {
        &self.detections
    }

    /// The learned favorable signature, once `learn_favorable_conditions` has run.
    pub fn favorable(&self) -> Option<&SlopeSignature> {
        self.favorable.as_ref()
    }
}

/// Physics and trend predictions for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Direct detector output on the dataset.
    pub physics_events: Vec<NaiveDateTime>,
    /// Breakdowns predicted by matching trailing windows against the
    /// favorable signature.
    pub trend_events: Vec<NaiveDateTime>,
}

/// Orchestrates detection, favorable-signature learning, and application.
#[derive(Debug, Clone)]
pub struct FracturePredictor {
    detector: EventDetector,
    tolerance: SimilarityTolerance,
    session: PredictionSession,
}

impl FracturePredictor {
    /// Create a predictor with the given detection settings and default
    /// similarity tolerances.
    pub fn new(settings: DetectionSettings) -> Self {
        Self {
            detector: EventDetector::new(settings),
            tolerance: SimilarityTolerance::default(),
            session: PredictionSession::default(),
        }
    }

    /// Override the signature-matching tolerances.
    pub fn with_tolerance(mut self, tolerance: SimilarityTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// The current session snapshot.
    pub fn session(&self) -> &PredictionSession {
        &self.session
    }

    /// Run the detector over every dataset, in parallel, and store the
    /// results keyed by dataset name. Prior stored detections are discarded.
    ///
    /// The collect below is the join barrier: the session is swapped only
    /// after every dataset has finished.
    pub fn detect_all(&mut self, datasets: &[Dataset]) -> &BTreeMap<String, Vec<NaiveDateTime>> {
        let detections: BTreeMap<String, Vec<NaiveDateTime>> = datasets
            .par_iter()
            .map(|data| (data.name().to_string(), self.detector.detect(data)))
            .collect();

        for (name, events) in &detections {
            debug!("{name}: {} breakdowns detected", events.len());
        }

        self.session = PredictionSession {
            detections,
            favorable: self.session.favorable.clone(),
        };
        &self.session.detections
    }

    /// Learn the favorable signature from the datasets' stored detections.
    ///
    /// Builds a pre-event signature for every stored breakdown using a
    /// [`PRE_BREAKDOWN_WINDOW_SECS`] lookback, then averages the defined
    /// slopes across every event window of every dataset. Datasets without
    /// stored detections are ignored; when none of the given datasets has
    /// been analyzed the call fails with [`PredictionError::NotYetAnalyzed`].
    pub fn learn_favorable_conditions(
        &mut self,
        datasets: &[Dataset],
    ) -> Result<&SlopeSignature, PredictionError> {
        let analyzed: Vec<&Dataset> = datasets
            .iter()
            .filter(|data| self.session.detections.contains_key(data.name()))
            .collect();

        if analyzed.is_empty() {
            return Err(PredictionError::NotYetAnalyzed);
        }

        let mut event_signatures = Vec::new();
        for data in analyzed {
            let events = &self.session.detections[data.name()];
            event_signatures.extend(signatures_before_events(
                data,
                events,
                PRE_BREAKDOWN_WINDOW_SECS,
            ));
        }

        info!(
            "learned favorable conditions from {} pre-breakdown windows",
            event_signatures.len()
        );

        let favorable = average_signatures(event_signatures.iter().map(|e| &e.signature));
        self.session = PredictionSession {
            detections: self.session.detections.clone(),
            favorable: None,
        };
        Ok(self.session.favorable.insert(favorable))
    }

    /// Apply the learned signature to a new dataset.
    ///
    /// Returns the direct physics detections plus trend predictions: for every
    /// reading, the trailing [`TREND_WINDOW_SECS`] window is slope-fitted and
    /// matched against the favorable signature; on a match, the first reading
    /// at or after [`TREND_OFFSET_SECS`] past the window end is emitted.
    ///
    /// Unlike the physics detector, trend prediction applies no debounce:
    /// adjacent matching windows each emit a prediction. The asymmetry is
    /// intentional: the trend detector is the permissive one, and the
    /// Hausdorff comparison is expected to absorb the duplicates.
    pub fn apply_to_new_dataset(&self, data: &Dataset) -> Result<Prediction, PredictionError> {
        let favorable = self
            .session
            .favorable
            .as_ref()
            .filter(|f| !f.is_empty())
            .ok_or(PredictionError::FavorableNotLearned)?;

        let physics_events = self.detector.detect(data);

        let readings = data.readings();
        let mut trend_events = Vec::new();

        for (i, reading) in readings.iter().enumerate() {
            let current_time = reading.time;
            let window_start = current_time - Duration::seconds(TREND_WINDOW_SECS);
            let lo = readings.partition_point(|r| r.time < window_start);
            let window = &readings[lo..=i];

            if window.len() < 2 {
                continue;
            }

            if !is_similar(&slopes_in_window(window), favorable, &self.tolerance) {
                continue;
            }

            let offset_time = current_time + Duration::seconds(TREND_OFFSET_SECS);
            let after = readings.partition_point(|r| r.time < offset_time);
            if let Some(target) = readings.get(after) {
                trend_events.push(target.time);
            }
        }

        Ok(Prediction {
            physics_events,
            trend_events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{pumping_reading, ts};

    /// A run whose permeability estimate spikes at `spike_at` seconds.
    fn spiked_dataset(name: &str, spike_at: i64) -> Dataset {
        let start = ts(10, 0, 0);
        let readings = (0..100)
            .map(|i| {
                let rate = if i == spike_at { 10.5 } else { 10.0 };
                pumping_reading(start + Duration::seconds(i), rate, 6000.0)
            })
            .collect();
        Dataset::new(name, readings)
    }

    #[test]
    fn apply_without_learning_is_a_precondition_error() {
        let predictor = FracturePredictor::new(DetectionSettings::default());
        let result = predictor.apply_to_new_dataset(&spiked_dataset("fresh", 40));
        assert!(matches!(result, Err(PredictionError::FavorableNotLearned)));
    }

    #[test]
    fn learning_before_any_detection_is_a_precondition_error() {
        let mut predictor = FracturePredictor::new(DetectionSettings::default());
        let datasets = vec![spiked_dataset("a", 40)];
        let result = predictor.learn_favorable_conditions(&datasets);
        assert!(matches!(result, Err(PredictionError::NotYetAnalyzed)));
    }

    #[test]
    fn detect_all_overwrites_prior_results() {
        let mut predictor = FracturePredictor::new(DetectionSettings::default());
        predictor.detect_all(&[spiked_dataset("first", 40)]);
        assert!(predictor.session().detections().contains_key("first"));

        predictor.detect_all(&[spiked_dataset("second", 50)]);
        let detections = predictor.session().detections();
        assert!(!detections.contains_key("first"));
        assert_eq!(detections["second"], vec![ts(10, 0, 50)]);
    }

    #[test]
    fn identical_datasets_average_to_any_single_signature() {
        let mut predictor = FracturePredictor::new(DetectionSettings::default());
        let datasets: Vec<Dataset> =
            (0..3).map(|i| spiked_dataset(&format!("stage{i}"), 40)).collect();

        predictor.detect_all(&datasets);
        predictor.learn_favorable_conditions(&datasets).unwrap();

        let favorable = predictor.session().favorable().unwrap().clone();
        let single = signatures_before_events(
            &datasets[0],
            &[ts(10, 0, 40)],
            PRE_BREAKDOWN_WINDOW_SECS,
        );
        assert_eq!(single.len(), 1);

        for (channel, slope) in single[0].signature.iter() {
            let Some(expected) = slope else { continue };
            let got = favorable.defined(channel).unwrap();
            assert!(
                (got - expected).abs() < 1e-12,
                "{channel}: averaged {got} vs single {expected}"
            );
        }
    }

    #[test]
    fn learning_ignores_datasets_without_stored_detections() {
        let mut predictor = FracturePredictor::new(DetectionSettings::default());
        let analyzed = vec![spiked_dataset("seen", 40)];
        predictor.detect_all(&analyzed);

        // A dataset that was never run through detect_all contributes nothing
        // but does not fail the call.
        let mut all = analyzed.clone();
        all.push(spiked_dataset("unseen", 50));
        assert!(predictor.learn_favorable_conditions(&all).is_ok());
    }

    #[test]
    fn trend_predictions_follow_matching_windows() {
        let mut predictor = FracturePredictor::new(DetectionSettings::default());
        let datasets = vec![spiked_dataset("train", 40)];
        predictor.detect_all(&datasets);
        predictor.learn_favorable_conditions(&datasets).unwrap();

        // The training run is near-flat before its breakdown, so a flat run
        // matches the favorable signature on most windows; every match emits
        // the reading 30 s downstream, undebounced.
        let target = spiked_dataset("target", 45);
        let prediction = predictor.apply_to_new_dataset(&target).unwrap();

        assert!(!prediction.trend_events.is_empty());
        // Emitted times sit at least the offset past the first possible
        // matching window end.
        for t in &prediction.trend_events {
            assert!(*t >= ts(10, 0, 31));
        }
        assert_eq!(prediction.physics_events, vec![ts(10, 0, 45)]);
    }
}
