//! Core telemetry data model: well readings, monitored channels, and datasets.
//!
//! A [`WellReading`] is one time-stamped row of treatment telemetry as produced
//! by the ingestion layer. Readings are immutable once constructed; every
//! downstream computation (duration, adjacency, regression) relies on the
//! time ordering that [`Dataset`] enforces at construction.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One time-stamped telemetry record from a treatment run.
///
/// Invariants:
/// - All channel values are in the source units (pressures in psi, rates in
///   bbl/min, concentrations in lb/gal unless noted).
/// - `total_b600_3050` is `None` when the source row did not carry the column;
///   "missing" and "zero" are deliberately distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellReading {
    /// Acquisition timestamp (the source format carries no timezone).
    pub time: NaiveDateTime,
    /// Treating (tubing) pressure, psi.
    pub treating_pressure: f64,
    /// Annulus pressure, psi.
    pub annulus_pressure: f64,
    /// Bottomhole pressure, psi.
    pub bottomhole_pressure: f64,
    /// Slurry pump rate, bbl/min.
    pub slurry_rate: f64,
    /// Clean fluid rate, bbl/min.
    pub clean_fluid_rate: f64,
    /// Surface proppant concentration.
    pub proppant_conc: f64,
    /// Bottomhole proppant concentration.
    pub bottomhole_proppant_conc: f64,
    /// Net pressure, psi.
    pub net_pressure: f64,
    /// Cumulative B600-3050 additive total. Absent from some source layouts.
    pub total_b600_3050: Option<f64>,
    /// Cumulative proppant total.
    pub total_proppant: f64,
    /// Cumulative clean fluid total.
    pub total_clean_fluid: f64,
    /// Cumulative slurry total.
    pub total_slurry: f64,
    /// B525 additive concentration.
    pub b525_conc: f64,
    /// B534 additive concentration.
    pub b534_conc: f64,
    /// J604 additive concentration.
    pub j604_conc: f64,
    /// U028 additive concentration.
    pub u028_conc: f64,
    /// J627 additive concentration.
    pub j627_conc: f64,
    /// PCM guar concentration.
    pub pcm_guar_conc: f64,
    /// J475 additive concentration.
    pub j475_conc: f64,
    /// J218 additive concentration.
    pub j218_conc: f64,
}

/// The closed set of channels used for pre-breakdown trend analysis.
///
/// These are the seven always-present pressure/rate/concentration channels
/// whose window slopes make up a [`SlopeSignature`](crate::signature::SlopeSignature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MonitoredChannel {
    /// Treating (tubing) pressure.
    TreatingPressure,
    /// Annulus pressure.
    AnnulusPressure,
    /// Bottomhole pressure.
    BottomholePressure,
    /// Slurry pump rate.
    SlurryRate,
    /// Surface proppant concentration.
    ProppantConc,
    /// Bottomhole proppant concentration.
    BottomholeProppantConc,
    /// Net pressure.
    NetPressure,
}

impl MonitoredChannel {
    /// All monitored channels, in canonical order.
    pub const ALL: [MonitoredChannel; 7] = [
        MonitoredChannel::TreatingPressure,
        MonitoredChannel::AnnulusPressure,
        MonitoredChannel::BottomholePressure,
        MonitoredChannel::SlurryRate,
        MonitoredChannel::ProppantConc,
        MonitoredChannel::BottomholeProppantConc,
        MonitoredChannel::NetPressure,
    ];

    /// Stable short name, matching the source-format column headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitoredChannel::TreatingPressure => "TrPress",
            MonitoredChannel::AnnulusPressure => "AnPress",
            MonitoredChannel::BottomholePressure => "BhPress",
            MonitoredChannel::SlurryRate => "SlurRate",
            MonitoredChannel::ProppantConc => "PropCon",
            MonitoredChannel::BottomholeProppantConc => "BhPropCon",
            MonitoredChannel::NetPressure => "NetPress",
        }
    }

    /// Read this channel's value from a reading.
    pub fn value_of(&self, reading: &WellReading) -> f64 {
        match self {
            MonitoredChannel::TreatingPressure => reading.treating_pressure,
            MonitoredChannel::AnnulusPressure => reading.annulus_pressure,
            MonitoredChannel::BottomholePressure => reading.bottomhole_pressure,
            MonitoredChannel::SlurryRate => reading.slurry_rate,
            MonitoredChannel::ProppantConc => reading.proppant_conc,
            MonitoredChannel::BottomholeProppantConc => reading.bottomhole_proppant_conc,
            MonitoredChannel::NetPressure => reading.net_pressure,
        }
    }
}

impl std::fmt::Display for MonitoredChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, time-ordered sequence of readings from one well/stage run.
///
/// Construction sorts the readings by timestamp (stable), so every consumer
/// may assume non-decreasing time order. Datasets are independent of each
/// other; no cross-dataset ordering exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    name: String,
    readings: Vec<WellReading>,
}

impl Dataset {
    /// Create a dataset, sorting the readings into time order.
    pub fn new(name: impl Into<String>, mut readings: Vec<WellReading>) -> Self {
        readings.sort_by_key(|r| r.time);
        Self {
            name: name.into(),
            readings,
        }
    }

    /// Dataset name (typically the source file stem).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The time-ordered readings.
    pub fn readings(&self) -> &[WellReading] {
        &self.readings
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True when the dataset holds no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// First and last timestamps, when any readings exist.
    pub fn time_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.readings.first(), self.readings.last()) {
            (Some(first), Some(last)) => Some((first.time, last.time)),
            _ => None,
        }
    }
}

/// Elapsed seconds from `earlier` to `later`, with millisecond resolution.
pub(crate) fn seconds_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    later.signed_duration_since(earlier).num_milliseconds() as f64 / 1_000.0
}
