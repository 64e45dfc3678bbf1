//! TOML configuration file support for power users.
//!
//! Instead of passing many CLI flags, users can specify settings in a config file:
//!
//! ```toml
//! # fracwatch.toml
//! [detection]
//! min_breakdown_duration_secs = 45.0
//! min_k_increase_ratio = 0.02
//! reservoir_pressure = 4200.0
//! fluid_viscosity = 1.8
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use fracwatch::settings::DetectionSettings;

/// Root configuration structure for fracwatch.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Detection-specific settings.
    #[serde(default)]
    pub detection: DetectionConfig,
}

/// Overrides for the detection settings; unset fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
pub struct DetectionConfig {
    /// Minimum spacing between detected breakdowns, seconds.
    pub min_breakdown_duration_secs: Option<f64>,

    /// Minimum relative permeability increase to trigger (0.01 = 1%).
    pub min_k_increase_ratio: Option<f64>,

    /// Fraction of the series trimmed as startup/shutdown transients.
    pub data_skip_proportion: Option<f64>,

    /// Minimum slurry rate to consider, bbl/min.
    pub min_rate_threshold: Option<f64>,

    /// Filtration radius, m.
    pub filtration_radius: Option<f64>,

    /// Reservoir pressure, psi.
    pub reservoir_pressure: Option<f64>,

    /// Fluid viscosity, cP.
    pub fluid_viscosity: Option<f64>,
}

impl DetectionConfig {
    /// Apply the set overrides on top of `base`.
    pub fn apply(&self, mut base: DetectionSettings) -> DetectionSettings {
        if let Some(v) = self.min_breakdown_duration_secs {
            base.min_breakdown_duration_secs = v;
        }
        if let Some(v) = self.min_k_increase_ratio {
            base.min_k_increase_ratio = v;
        }
        if let Some(v) = self.data_skip_proportion {
            base.data_skip_proportion = v;
        }
        if let Some(v) = self.min_rate_threshold {
            base.min_rate_threshold = v;
        }
        if let Some(v) = self.filtration_radius {
            base.filtration_radius = v;
        }
        if let Some(v) = self.reservoir_pressure {
            base.reservoir_pressure = v;
        }
        if let Some(v) = self.fluid_viscosity {
            base.fluid_viscosity = v;
        }
        base
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [detection]
            min_breakdown_duration_secs = 45.0
            min_k_increase_ratio = 0.02
            reservoir_pressure = 4200.0
            fluid_viscosity = 1.8
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.detection.min_breakdown_duration_secs, Some(45.0));
        assert_eq!(config.detection.min_k_increase_ratio, Some(0.02));
        assert_eq!(config.detection.reservoir_pressure, Some(4200.0));
        assert_eq!(config.detection.fluid_viscosity, Some(1.8));
        assert_eq!(config.detection.min_rate_threshold, None);
    }

    #[test]
    fn test_apply_overrides_only_set_fields() {
        let config = Config::from_str("[detection]\nreservoir_pressure = 3500.0").unwrap();
        let settings = config.detection.apply(DetectionSettings::default());
        assert_eq!(settings.reservoir_pressure, 3500.0);
        assert_eq!(settings.min_k_increase_ratio, 0.01);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.detection.min_breakdown_duration_secs, None);
    }
}
