//! Shared helpers for unit tests: synthetic readings and timestamps.

use crate::record::WellReading;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Timestamp on a fixed test date. Overflowing minutes or seconds carry into
/// the next unit, so `ts(10, 0, 80)` is 10:01:20.
pub(crate) fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
        + Duration::seconds(i64::from(m) * 60 + i64::from(s))
}

/// A reading with every channel zeroed.
pub(crate) fn zero_reading(time: NaiveDateTime) -> WellReading {
    WellReading {
        time,
        treating_pressure: 0.0,
        annulus_pressure: 0.0,
        bottomhole_pressure: 0.0,
        slurry_rate: 0.0,
        clean_fluid_rate: 0.0,
        proppant_conc: 0.0,
        bottomhole_proppant_conc: 0.0,
        net_pressure: 0.0,
        total_b600_3050: None,
        total_proppant: 0.0,
        total_clean_fluid: 0.0,
        total_slurry: 0.0,
        b525_conc: 0.0,
        b534_conc: 0.0,
        j604_conc: 0.0,
        u028_conc: 0.0,
        j627_conc: 0.0,
        pcm_guar_conc: 0.0,
        j475_conc: 0.0,
        j218_conc: 0.0,
    }
}

/// A reading with the pumping channels set; everything else zero.
pub(crate) fn pumping_reading(time: NaiveDateTime, slurry_rate: f64, bottomhole_pressure: f64) -> WellReading {
    WellReading {
        slurry_rate,
        bottomhole_pressure,
        ..zero_reading(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ts_carries_overflowing_seconds_into_minutes() {
        assert_eq!(ts(10, 0, 80), ts(10, 1, 20));
        assert_eq!(ts(9, 75, 0), ts(10, 15, 0));
    }
}
