//! Discrete Hausdorff distance between timestamp sets.
//!
//! Quantifies agreement between two detectors: the worst-case nearest-neighbor
//! gap, in seconds, between the physics-based and trend-based breakdown times.

use chrono::NaiveDateTime;

use crate::record::seconds_between;

/// Errors from the Hausdorff computation.
#[derive(Debug, thiserror::Error)]
pub enum HausdorffError {
    /// One of the input sets holds no timestamps, so the minimum over it is
    /// undefined.
    #[error("cannot compute Hausdorff distance: the {0} timestamp set is empty")]
    EmptySet(&'static str),
}

/// Symmetric discrete Hausdorff distance between two timestamp sets, seconds.
///
/// The directed distance A→B is the maximum over A of each point's minimum
/// absolute gap to B; the result is the larger of the two directed distances.
/// Both sets must be non-empty.
pub fn distance(a: &[NaiveDateTime], b: &[NaiveDateTime]) -> Result<f64, HausdorffError> {
    if a.is_empty() {
        return Err(HausdorffError::EmptySet("first"));
    }
    if b.is_empty() {
        return Err(HausdorffError::EmptySet("second"));
    }

    Ok(directed(a, b).max(directed(b, a)))
}

fn directed(from: &[NaiveDateTime], to: &[NaiveDateTime]) -> f64 {
    from.iter()
        .map(|&x| {
            to.iter()
                .map(|&y| seconds_between(x, y).abs())
                .fold(f64::INFINITY, f64::min)
        })
        .fold(0.0, f64::max)
}
