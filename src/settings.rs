//! Detection configuration.

use serde::{Deserialize, Serialize};

/// Tuning parameters and physical constants for breakdown detection.
///
/// Immutable once constructed; the defaults are the field-calibrated values
/// and apply to any parameter left unset by the configuration layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Minimum spacing between two detected breakdowns, seconds (debounce).
    pub min_breakdown_duration_secs: f64,
    /// Minimum relative increase of the permeability estimate over its
    /// trailing average to count as a spike (0.01 = 1%).
    pub min_k_increase_ratio: f64,
    /// Fraction of the series trimmed as startup/shutdown transients. The
    /// full proportion is trimmed from the start and half of it from the end.
    pub data_skip_proportion: f64,
    /// Minimum slurry rate to consider a sample at all, bbl/min.
    pub min_rate_threshold: f64,
    /// Filtration radius, m.
    pub filtration_radius: f64,
    /// Reservoir pressure, psi.
    pub reservoir_pressure: f64,
    /// Fluid viscosity, cP.
    pub fluid_viscosity: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_breakdown_duration_secs: 30.0,
            min_k_increase_ratio: 0.01,
            data_skip_proportion: 0.2,
            min_rate_threshold: 0.1,
            filtration_radius: 0.5,
            reservoir_pressure: 3000.0,
            fluid_viscosity: 2.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_field_calibration() {
        let s = DetectionSettings::default();
        assert_eq!(s.min_breakdown_duration_secs, 30.0);
        assert_eq!(s.min_k_increase_ratio, 0.01);
        assert_eq!(s.data_skip_proportion, 0.2);
        assert_eq!(s.min_rate_threshold, 0.1);
        assert_eq!(s.filtration_radius, 0.5);
        assert_eq!(s.reservoir_pressure, 3000.0);
        assert_eq!(s.fluid_viscosity, 2.5);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let s: DetectionSettings =
            toml::from_str("min_rate_threshold = 0.5\nreservoir_pressure = 4200.0").unwrap();
        assert_eq!(s.min_rate_threshold, 0.5);
        assert_eq!(s.reservoir_pressure, 4200.0);
        assert_eq!(s.min_k_increase_ratio, 0.01);
    }
}
