//! Lap segmentation
//!
//! Turns a lap's start time and cumulative sector durations into the three
//! time intervals used for sector attribution, and selects each driver's
//! best lap.
//!
//! Boundary policy: sector 1 is inclusive of both ends; sectors 2 and 3 are
//! exclusive of the lower bound and inclusive of the upper bound, so a
//! sample landing exactly on a boundary belongs to the earlier sector.

use crate::labels::Sector;
use crate::model::Lap;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Convert fractional seconds to a chrono Duration at microsecond precision.
fn secs(s: f64) -> Duration {
    Duration::microseconds((s * 1e6).round() as i64)
}

/// The three sector time intervals of a single lap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorIntervals {
    pub start: DateTime<Utc>,
    pub sector_1_end: DateTime<Utc>,
    pub sector_2_end: DateTime<Utc>,
    pub sector_3_end: DateTime<Utc>,
}

impl SectorIntervals {
    /// Compute the intervals for a lap.
    ///
    /// Returns None when the lap cannot be segmented: missing start time,
    /// or a missing or negative sector duration. Callers skip such laps
    /// rather than failing the surrounding computation.
    pub fn from_lap(lap: &Lap) -> Option<Self> {
        let start = lap.date_start?;
        let d1 = lap.duration_sector_1?;
        let d2 = lap.duration_sector_2?;
        let d3 = lap.duration_sector_3?;

        if d1 < 0.0 || d2 < 0.0 || d3 < 0.0 || !(d1 + d2 + d3).is_finite() {
            return None;
        }

        let sector_1_end = start + secs(d1);
        let sector_2_end = start + secs(d1 + d2);
        let sector_3_end = start + secs(d1 + d2 + d3);

        Some(SectorIntervals {
            start,
            sector_1_end,
            sector_2_end,
            sector_3_end,
        })
    }

    /// Assign a timestamp to a sector, testing sector 1 first.
    ///
    /// Returns None for timestamps outside all three intervals.
    pub fn classify(&self, ts: DateTime<Utc>) -> Option<Sector> {
        if ts >= self.start && ts <= self.sector_1_end {
            Some(Sector::Sector1)
        } else if ts > self.sector_1_end && ts <= self.sector_2_end {
            Some(Sector::Sector2)
        } else if ts > self.sector_2_end && ts <= self.sector_3_end {
            Some(Sector::Sector3)
        } else {
            None
        }
    }

    /// End of the lap's last interval.
    pub fn end(&self) -> DateTime<Utc> {
        self.sector_3_end
    }
}

/// Select the best lap per (session_key, driver_number).
///
/// The best lap is the one with minimal `lap_duration` among laps with a
/// non-null lap number; exact duration ties break to the lower lap number.
/// Laps without a duration are ignored. Drivers with no qualifying lap are
/// simply absent from the result.
pub fn best_laps_by_driver(laps: &[Lap]) -> BTreeMap<(u32, u32), Lap> {
    let mut best: BTreeMap<(u32, u32), Lap> = BTreeMap::new();

    for lap in laps {
        let Some(lap_number) = lap.lap_number else {
            continue;
        };
        let Some(duration) = lap.lap_duration else {
            continue;
        };
        if !duration.is_finite() {
            continue;
        }

        let key = (lap.session_key, lap.driver_number);
        match best.get(&key) {
            None => {
                best.insert(key, lap.clone());
            }
            Some(current) => {
                // current always has Some duration and lap_number
                let cur_duration = current.lap_duration.unwrap_or(f64::INFINITY);
                let cur_number = current.lap_number.unwrap_or(u32::MAX);
                if duration < cur_duration
                    || (duration == cur_duration && lap_number < cur_number)
                {
                    best.insert(key, lap.clone());
                }
            }
        }
    }

    best
}
