//! Sample-to-sector attribution
//!
//! Maps every telemetry sample of one (session, driver) partition onto the
//! sector of the lap whose time interval contains it. Samples and lap
//! intervals are both time-ordered, so attribution is a single forward
//! sweep: O(samples + laps), never O(samples x laps).
//!
//! Samples outside every interval keep a None sector; they are excluded
//! from sector-scoped aggregates but still usable for whole-session ones.

use crate::labels::{BrakeState, DrsState, Sector};
use crate::model::{Lap, TelemetrySample};
use crate::segment::SectorIntervals;
use chrono::{DateTime, Utc};

/// A telemetry sample annotated with its derived state labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSample {
    pub date: DateTime<Utc>,
    pub speed: f64,
    pub throttle: f64,
    pub drs: DrsState,
    pub brake: BrakeState,
    /// Lap the sample fell into, when attributable
    pub lap_number: Option<u32>,
    /// Sector the sample fell into; None = outside every interval
    pub sector: Option<Sector>,
}

/// Result of attributing one driver's sample stream
#[derive(Debug, Clone)]
pub struct Attribution {
    pub samples: Vec<LabeledSample>,
    /// Samples that matched no sector interval
    pub outside_samples: usize,
    /// Laps that could not be segmented (missing start or bad durations)
    pub skipped_laps: usize,
}

struct LapIntervals {
    lap_number: Option<u32>,
    intervals: SectorIntervals,
}

/// Attribute sectors to an ordered sample stream.
///
/// `samples` must be ascending by `date` (the store guarantees this) and
/// `laps` must all belong to the same (session, driver) partition. Laps
/// that cannot be segmented are counted and skipped. When malformed data
/// makes lap intervals overlap, the earliest-starting lap wins.
pub fn attribute_sectors(samples: &[TelemetrySample], laps: &[Lap]) -> Attribution {
    let mut lap_windows: Vec<LapIntervals> = Vec::with_capacity(laps.len());
    let mut skipped_laps = 0;

    for lap in laps {
        match SectorIntervals::from_lap(lap) {
            Some(intervals) => lap_windows.push(LapIntervals {
                lap_number: lap.lap_number,
                intervals,
            }),
            None => {
                tracing::debug!(
                    session_key = lap.session_key,
                    driver_number = lap.driver_number,
                    lap_number = ?lap.lap_number,
                    "skipping unsegmentable lap"
                );
                skipped_laps += 1;
            }
        }
    }

    lap_windows.sort_by_key(|w| w.intervals.start);

    let mut labeled = Vec::with_capacity(samples.len());
    let mut outside_samples = 0;
    let mut idx = 0;

    for sample in samples {
        // Drop windows that ended before this sample; they cannot contain
        // any later sample either.
        while idx < lap_windows.len() && lap_windows[idx].intervals.end() < sample.date {
            idx += 1;
        }

        let mut sector = None;
        let mut lap_number = None;
        let mut j = idx;
        while j < lap_windows.len() && lap_windows[j].intervals.start <= sample.date {
            if let Some(s) = lap_windows[j].intervals.classify(sample.date) {
                sector = Some(s);
                lap_number = lap_windows[j].lap_number;
                break;
            }
            j += 1;
        }

        if sector.is_none() {
            outside_samples += 1;
        }

        labeled.push(LabeledSample {
            date: sample.date,
            speed: sample.speed,
            throttle: sample.throttle,
            drs: DrsState::from_code(sample.drs),
            brake: BrakeState::from_raw(sample.brake),
            lap_number,
            sector,
        });
    }

    Attribution {
        samples: labeled,
        outside_samples,
        skipped_laps,
    }
}
