//! Physics-based breakdown detection.
//!
//! Scans a dataset for sudden relative increases in a radial-flow permeability
//! estimate `k` computed from slurry rate and bottomhole pressure. A spike of
//! `k` above its trailing average marks formation breakdown (the onset of
//! induced fracturing).

use chrono::NaiveDateTime;
use log::debug;

use crate::record::{seconds_between, Dataset};
use crate::settings::DetectionSettings;

/// Trailing samples averaged to smooth the permeability estimate.
const SMOOTHING_LEN: usize = 5;

/// bbl/min → m³/s conversion divisors.
const BBL_PER_M3: f64 = 8.3864;
const SECS_PER_MIN: f64 = 60.0;

/// cP → Pa·s.
const CP_TO_PA_S: f64 = 1e-3;

/// Pressure-differential denominators smaller than this are degenerate.
const MIN_DENOMINATOR: f64 = 1e-6;

/// Fixed-capacity trailing window of permeability estimates.
///
/// Stack-allocated ring buffer; the oldest value is evicted once full.
/// Resetting after a detection replaces the whole value with an empty one so
/// a single physical spike cannot re-trigger on its own tail.
#[derive(Debug, Clone, Copy, Default)]
struct SmoothingWindow {
    values: [f64; SMOOTHING_LEN],
    len: usize,
    next: usize,
}

impl SmoothingWindow {
    fn push(&mut self, k: f64) {
        self.values[self.next] = k;
        self.next = (self.next + 1) % SMOOTHING_LEN;
        if self.len < SMOOTHING_LEN {
            self.len += 1;
        }
    }

    /// Average of the window, only once it has filled.
    fn full_average(&self) -> Option<f64> {
        if self.len < SMOOTHING_LEN {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / SMOOTHING_LEN as f64)
    }
}

/// Detects breakdown moments from the permeability-estimate spike criterion.
#[derive(Debug, Clone)]
pub struct EventDetector {
    settings: DetectionSettings,
}

impl EventDetector {
    /// Create a detector with the given settings.
    pub fn new(settings: DetectionSettings) -> Self {
        Self { settings }
    }

    /// The settings this detector runs with.
    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Scan `data` and return breakdown timestamps, time-ordered.
    ///
    /// The first `data_skip_proportion` of the series and the trailing half of
    /// that proportion are ignored as startup/shutdown transients. Samples
    /// below the rate threshold, or with a degenerate pressure differential,
    /// are skipped without resetting the smoothing window's trigger state.
    pub fn detect(&self, data: &Dataset) -> Vec<NaiveDateTime> {
        let readings = data.readings();
        let mut result = Vec::new();

        if readings.len() < 2 {
            return result;
        }

        let n = readings.len();
        let start = (n as f64 * self.settings.data_skip_proportion) as usize;
        let end = n.saturating_sub((n as f64 * self.settings.data_skip_proportion / 2.0) as usize);

        let mut window = SmoothingWindow::default();
        let mut last_breakdown: Option<NaiveDateTime> = None;

        for reading in readings.iter().take(end).skip(start + 1) {
            let current_time = reading.time;

            if let Some(last) = last_breakdown {
                if seconds_between(last, current_time) < self.settings.min_breakdown_duration_secs {
                    continue;
                }
            }

            if reading.slurry_rate < self.settings.min_rate_threshold {
                continue;
            }

            // Volumetric flow in m³/s.
            let q = reading.slurry_rate / BBL_PER_M3 / SECS_PER_MIN;
            let mu = self.settings.fluid_viscosity * CP_TO_PA_S;

            let denominator = (reading.bottomhole_pressure - self.settings.reservoir_pressure)
                * self.settings.filtration_radius;

            if denominator.abs() < MIN_DENOMINATOR || q <= 0.0 {
                continue;
            }

            let k = (mu / (4.0 * std::f64::consts::PI)) * (q / denominator);

            window.push(k);

            if let Some(avg_k) = window.full_average() {
                let delta_k = k - avg_k;

                // Sensitive to small sustained increases; the upper bound
                // rejects single-sample noise spikes.
                if delta_k > avg_k * self.settings.min_k_increase_ratio && delta_k < avg_k * 5.0 {
                    debug!(
                        "breakdown at {current_time} (k = {k:.3e}, trailing avg = {avg_k:.3e})"
                    );
                    result.push(current_time);
                    last_breakdown = Some(current_time);

                    // Fresh window so this spike's tail cannot re-trigger.
                    window = SmoothingWindow::default();
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{pumping_reading, ts};
    use chrono::Duration;

    /// 100 one-second samples at a steady rate, with optional rate spikes.
    fn steady_run(name: &str, base_rate: f64, spikes: &[(usize, f64)]) -> Dataset {
        let start = ts(10, 0, 0);
        let readings = (0..100)
            .map(|i| {
                let rate = spikes
                    .iter()
                    .find(|(at, _)| *at == i)
                    .map(|(_, r)| *r)
                    .unwrap_or(base_rate);
                pumping_reading(start + Duration::seconds(i as i64), rate, 6000.0)
            })
            .collect();
        Dataset::new(name, readings)
    }

    #[test]
    fn steady_rate_produces_no_events() {
        let detector = EventDetector::new(DetectionSettings::default());
        assert!(detector.detect(&steady_run("steady", 10.0, &[])).is_empty());
    }

    #[test]
    fn rate_spike_inside_analysis_range_is_detected() {
        let detector = EventDetector::new(DetectionSettings::default());
        let data = steady_run("spiked", 10.0, &[(40, 10.5)]);
        let events = detector.detect(&data);
        assert_eq!(events, vec![ts(10, 0, 40)]);
    }

    #[test]
    fn spike_inside_trimmed_head_is_ignored() {
        // Default skip proportion trims the first 20 of 100 samples.
        let detector = EventDetector::new(DetectionSettings::default());
        let data = steady_run("early-spike", 10.0, &[(10, 10.5)]);
        assert!(detector.detect(&data).is_empty());
    }

    #[test]
    fn spike_inside_trimmed_tail_is_ignored() {
        // Half the skip proportion trims the last 10 of 100 samples.
        let detector = EventDetector::new(DetectionSettings::default());
        let data = steady_run("late-spike", 10.0, &[(95, 10.5)]);
        assert!(detector.detect(&data).is_empty());
    }

    #[test]
    fn low_rate_yields_no_events_regardless_of_pressure() {
        let detector = EventDetector::new(DetectionSettings::default());
        // All rates sit below the 0.1 bbl/min threshold; pressures are large.
        let data = steady_run("idle", 0.05, &[(40, 0.09)]);
        assert!(detector.detect(&data).is_empty());
    }

    #[test]
    fn debounce_separates_adjacent_spikes() {
        let detector = EventDetector::new(DetectionSettings::default());
        // Second spike 10 s after the first falls inside the debounce gap.
        let data = steady_run("double", 10.0, &[(40, 10.5), (50, 10.5)]);
        let events = detector.detect(&data);
        assert_eq!(events, vec![ts(10, 0, 40)]);
    }

    #[test]
    fn spikes_outside_debounce_both_fire() {
        let detector = EventDetector::new(DetectionSettings::default());
        let data = steady_run("twice", 10.0, &[(40, 10.5), (80, 10.5)]);
        let events = detector.detect(&data);
        assert_eq!(events, vec![ts(10, 0, 40), ts(10, 1, 20)]);
    }

    #[test]
    fn spike_over_depressed_trailing_average_is_rejected_as_noise() {
        // Samples with bottomhole below reservoir pressure give negative k
        // values, so the trailing average stays negative; the lone positive
        // spike then violates `delta < 5 * avg` and the upper noise bound
        // rejects it.
        let detector = EventDetector::new(DetectionSettings::default());
        let start = ts(10, 0, 0);
        let readings = (0..100)
            .map(|i| {
                let bhp = if i == 40 { 3300.0 } else { 2700.0 };
                pumping_reading(start + Duration::seconds(i as i64), 10.0, bhp)
            })
            .collect();
        assert!(detector.detect(&Dataset::new("noise", readings)).is_empty());
    }

    #[test]
    fn degenerate_pressure_differential_is_skipped() {
        let detector = EventDetector::new(DetectionSettings::default());
        let start = ts(10, 0, 0);
        // Bottomhole pressure equals reservoir pressure: zero denominator.
        let readings = (0..100)
            .map(|i| pumping_reading(start + Duration::seconds(i as i64), 10.0, 3000.0))
            .collect();
        assert!(detector.detect(&Dataset::new("balanced", readings)).is_empty());
    }

    #[test]
    fn short_series_yields_no_events() {
        let detector = EventDetector::new(DetectionSettings::default());
        let data = Dataset::new("one", vec![pumping_reading(ts(10, 0, 0), 10.0, 6000.0)]);
        assert!(detector.detect(&data).is_empty());
    }

    #[test]
    fn smoothing_window_fills_then_evicts_oldest() {
        let mut w = SmoothingWindow::default();
        for v in [1.0, 2.0, 3.0, 4.0] {
            w.push(v);
            assert!(w.full_average().is_none());
        }
        w.push(5.0);
        assert_eq!(w.full_average(), Some(3.0));
        w.push(11.0); // evicts 1.0
        assert_eq!(w.full_average(), Some(5.0));
    }
}
