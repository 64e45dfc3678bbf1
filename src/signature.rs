//! Pre-breakdown slope signatures.
//!
//! A [`SlopeSignature`] maps each monitored channel to the ordinary-least-squares
//! slope of that channel over a time window, or to "undefined" when the slope
//! is not computable. Per-event signatures taken just before historically
//! detected breakdowns are averaged into a "favorable" signature describing the
//! typical pre-breakdown trend shape, which new windows are then matched
//! against.
//!
//! Undefined slopes are represented as `None`, never NaN, so "missing" and
//! "zero" can never be conflated by downstream arithmetic.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::record::{seconds_between, Dataset, MonitoredChannel, WellReading};

/// Regression denominators smaller than this mean a degenerate time axis.
const SLOPE_DENOM_EPS: f64 = 1e-8;

/// Slopes within this distance of zero are treated as "flat" when matching.
const NEAR_ZERO: f64 = 1e-4;

/// Guard against division by zero in the relative-difference test.
const RELATIVE_EPS: f64 = 1e-6;

/// Per-channel regression slopes over one time window.
///
/// A value object: freely copyable, never mutated after creation. An entry of
/// `None` means the slope was not computable for that channel; a channel with
/// no entry at all contributed nothing (averaged signatures only contain
/// channels that had at least one defined contribution).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlopeSignature {
    slopes: BTreeMap<MonitoredChannel, Option<f64>>,
}

impl SlopeSignature {
    /// Build a signature from `(channel, slope)` entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (MonitoredChannel, Option<f64>)>) -> Self {
        Self {
            slopes: entries.into_iter().collect(),
        }
    }

    /// Number of channels carried, counting undefined entries.
    pub fn channel_count(&self) -> usize {
        self.slopes.len()
    }

    /// True when no channel has an entry.
    pub fn is_empty(&self) -> bool {
        self.slopes.is_empty()
    }

    /// The entry for `channel`: `None` when absent, `Some(None)` when present
    /// but undefined.
    pub fn entry(&self, channel: MonitoredChannel) -> Option<Option<f64>> {
        self.slopes.get(&channel).copied()
    }

    /// The defined slope for `channel`, if present and computable.
    pub fn defined(&self, channel: MonitoredChannel) -> Option<f64> {
        self.slopes.get(&channel).copied().flatten()
    }

    /// Iterate entries in canonical channel order.
    pub fn iter(&self) -> impl Iterator<Item = (MonitoredChannel, Option<f64>)> + '_ {
        self.slopes.iter().map(|(c, s)| (*c, *s))
    }
}

impl std::fmt::Display for SlopeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (channel, slope) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            match slope {
                Some(v) => write!(f, "{channel}: {v:.5}")?,
                None => write!(f, "{channel}: undefined")?,
            }
        }
        Ok(())
    }
}

/// A detected breakdown paired with the slope signature of its pre-event window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSignature {
    /// The breakdown timestamp the window precedes.
    pub event_time: NaiveDateTime,
    /// Slopes over the window ending at `event_time`.
    pub signature: SlopeSignature,
}

impl std::fmt::Display for EventSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} => {}", self.event_time.format("%H:%M:%S"), self.signature)
    }
}

/// Fit OLS slopes for every monitored channel over `window`.
///
/// X is elapsed seconds since the window's first reading; the slope is the
/// closed form `(nΣxy − ΣxΣy) / (nΣx² − (Σx)²)`. Windows with fewer than two
/// readings, or a near-constant time axis, yield undefined slopes for every
/// channel.
pub fn slopes_in_window(window: &[WellReading]) -> SlopeSignature {
    let n = window.len();
    if n < 2 {
        return SlopeSignature::from_entries(MonitoredChannel::ALL.map(|c| (c, None)));
    }

    let origin = window[0].time;
    let xs: Vec<f64> = window.iter().map(|r| seconds_between(origin, r.time)).collect();

    let nf = n as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_xx: f64 = xs.iter().map(|x| x * x).sum();
    let denominator = nf * sum_xx - sum_x * sum_x;

    if denominator.abs() < SLOPE_DENOM_EPS {
        return SlopeSignature::from_entries(MonitoredChannel::ALL.map(|c| (c, None)));
    }

    SlopeSignature::from_entries(MonitoredChannel::ALL.map(|channel| {
        let mut sum_y = 0.0;
        let mut sum_xy = 0.0;
        for (reading, x) in window.iter().zip(&xs) {
            let y = channel.value_of(reading);
            sum_y += y;
            sum_xy += x * y;
        }
        let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
        (channel, Some(slope))
    }))
}

/// Compute a slope signature for the window preceding each event.
///
/// Each window spans `[event − window_secs, event]` inclusive. Events whose
/// window holds fewer than two readings are skipped.
pub fn signatures_before_events(
    data: &Dataset,
    events: &[NaiveDateTime],
    window_secs: i64,
) -> Vec<EventSignature> {
    let readings = data.readings();
    let mut out = Vec::new();

    for &event_time in events {
        let window_start = event_time - Duration::seconds(window_secs);
        let lo = readings.partition_point(|r| r.time < window_start);
        let hi = readings.partition_point(|r| r.time <= event_time);
        let window = &readings[lo..hi];

        if window.len() < 2 {
            continue;
        }

        out.push(EventSignature {
            event_time,
            signature: slopes_in_window(window),
        });
    }

    out
}

/// Average defined slopes per channel across many signatures.
///
/// Undefined entries contribute nothing; a channel with no defined
/// contribution anywhere is absent from the result.
pub fn average_signatures<'a, I>(signatures: I) -> SlopeSignature
where
    I: IntoIterator<Item = &'a SlopeSignature>,
{
    let mut sums: BTreeMap<MonitoredChannel, (f64, usize)> = BTreeMap::new();

    for signature in signatures {
        for (channel, slope) in signature.iter() {
            if let Some(v) = slope {
                let (sum, count) = sums.entry(channel).or_insert((0.0, 0));
                *sum += v;
                *count += 1;
            }
        }
    }

    SlopeSignature::from_entries(
        sums.into_iter()
            .map(|(channel, (sum, count))| (channel, Some(sum / count as f64))),
    )
}

/// Tolerances for signature matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityTolerance {
    /// Maximum relative slope difference, `|c − r| / (|r| + ε)`.
    pub relative: f64,
    /// Maximum absolute slope difference.
    pub absolute: f64,
    /// Fraction of the reference's channels that must match.
    pub required_match_ratio: f64,
}

impl Default for SimilarityTolerance {
    fn default() -> Self {
        Self {
            relative: 0.1,
            absolute: 0.01,
            required_match_ratio: 0.9,
        }
    }
}

/// Judge whether `candidate` matches `reference` channel by channel.
///
/// A reference channel counts as matched when both slopes are near zero, or
/// the relative or absolute difference is within tolerance. Channels missing
/// from the candidate, or undefined on either side, are skipped from the match
/// count, but the denominator is always the reference's full channel count,
/// so a candidate missing many channels cannot pass.
pub fn is_similar(
    candidate: &SlopeSignature,
    reference: &SlopeSignature,
    tolerance: &SimilarityTolerance,
) -> bool {
    let total = reference.channel_count();
    if total == 0 {
        return false;
    }

    let mut matches = 0usize;

    for (channel, reference_slope) in reference.iter() {
        let Some(reference_slope) = reference_slope else {
            continue;
        };
        let Some(candidate_slope) = candidate.defined(channel) else {
            continue;
        };

        if reference_slope.abs() < NEAR_ZERO && candidate_slope.abs() < NEAR_ZERO {
            matches += 1;
            continue;
        }

        let abs_diff = (candidate_slope - reference_slope).abs();
        let ratio = abs_diff / (reference_slope.abs() + RELATIVE_EPS);

        if ratio <= tolerance.relative || abs_diff <= tolerance.absolute {
            matches += 1;
        }
    }

    matches as f64 / total as f64 >= tolerance.required_match_ratio
}
