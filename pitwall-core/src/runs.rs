//! State-run detection
//!
//! A run is a maximal contiguous span of samples sharing the same derived
//! state tuple (DRS state, brake state, sector). Detection is a single
//! sequential scan; it cannot be parallelized within a partition because
//! each sample's run membership depends on its predecessor.

use crate::attribution::LabeledSample;
use crate::labels::{BrakeState, DrsState, Sector};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One detected run
///
/// `index` increases monotonically over the partition's scan, so two
/// time-disjoint runs with identical labels stay distinct groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateRun {
    pub index: usize,
    pub drs: DrsState,
    pub brake: BrakeState,
    pub sector: Sector,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub start_speed: f64,
    pub end_speed: f64,
    pub sample_count: usize,
}

/// Detect state runs over an ordered, sector-labeled sample stream.
///
/// Samples without a sector label are not part of any run and are passed
/// over; they do not split a run on their own (the sector label of the
/// surrounding samples decides that). A new run starts at the first labeled
/// sample and whenever the (drs, brake, sector) tuple changes.
///
/// The returned runs partition the labeled samples exactly: contiguous,
/// non-overlapping, ordered by start time, sample counts summing to the
/// number of labeled input samples.
pub fn detect_runs(samples: &[LabeledSample]) -> Vec<StateRun> {
    let mut runs: Vec<StateRun> = Vec::new();

    for sample in samples {
        let Some(sector) = sample.sector else {
            continue;
        };

        let extends_current = runs.last().is_some_and(|run| {
            run.drs == sample.drs && run.brake == sample.brake && run.sector == sector
        });

        if extends_current {
            if let Some(run) = runs.last_mut() {
                run.end = sample.date;
                run.end_speed = sample.speed;
                run.sample_count += 1;
            }
        } else {
            runs.push(StateRun {
                index: runs.len(),
                drs: sample.drs,
                brake: sample.brake,
                sector,
                start: sample.date,
                end: sample.date,
                start_speed: sample.speed,
                end_speed: sample.speed,
                sample_count: 1,
            });
        }
    }

    runs
}
