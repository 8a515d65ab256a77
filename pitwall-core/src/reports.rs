//! Report catalog
//!
//! Each report is a pure function over the record store: fetch materialized
//! snapshots, run the attribution/run-detection pipeline, aggregate, and
//! return typed rows. Row field order is the report's column order
//! (grouping keys first, then metrics). Store failures abort the report;
//! data-quality problems drop the offending lap or sample and continue.

use crate::attribution::attribute_sectors;
use crate::labels::{BrakeState, DrsState, Sector};
use crate::model::Lap;
use crate::runs::detect_runs;
use crate::segment::{best_laps_by_driver, SectorIntervals};
use crate::stats::{instantaneous_accelerations, mean, DataQuality};
use crate::store::{RecordStore, SessionFilter, StoreError};
use crate::units::{Celsius, KilometersPerHour, MetersPerSecondSquared, Percent};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// Error surfaced by a report computation
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn warn_data_quality(report: &str, dq: &DataQuality) {
    if !dq.is_clean() {
        tracing::warn!(
            report,
            out_of_order_pairs = dq.out_of_order_pairs,
            outside_samples = dq.outside_samples,
            skipped_laps = dq.skipped_laps,
            "dropped rows while computing report"
        );
    }
}

fn laps_by_driver(laps: Vec<Lap>) -> BTreeMap<(u32, u32), Vec<Lap>> {
    let mut grouped: BTreeMap<(u32, u32), Vec<Lap>> = BTreeMap::new();
    for lap in laps {
        grouped
            .entry((lap.session_key, lap.driver_number))
            .or_default()
            .push(lap);
    }
    grouped
}

// ============================================================================
// Report 1: average speed per sector on each driver's best lap
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SectorSpeedRow {
    pub session_key: u32,
    pub driver_number: u32,
    pub lap_number: u32,
    pub sector: Sector,
    pub avg_speed: KilometersPerHour,
}

/// Mean telemetry speed per sector, scoped to each driver's best lap.
///
/// Drivers without a best lap, or whose best lap cannot be segmented, are
/// omitted. Rows are ordered by (session, driver), then sector.
pub fn best_lap_sector_speed(
    store: &dyn RecordStore,
    filter: &SessionFilter,
) -> Result<Vec<SectorSpeedRow>, ReportError> {
    let laps = store.laps_for_session(filter)?;
    let best = best_laps_by_driver(&laps);

    let mut rows = Vec::new();
    let mut dq = DataQuality::default();

    for ((session_key, driver_number), lap) in &best {
        let Some(lap_number) = lap.lap_number else {
            continue;
        };
        let Some(intervals) = SectorIntervals::from_lap(lap) else {
            dq.skipped_laps += 1;
            continue;
        };

        let telemetry = store.telemetry_for_driver(*session_key, *driver_number)?;

        let mut sums: BTreeMap<Sector, (f64, usize)> = BTreeMap::new();
        for sample in &telemetry {
            if let Some(sector) = intervals.classify(sample.date) {
                let entry = sums.entry(sector).or_insert((0.0, 0));
                entry.0 += sample.speed;
                entry.1 += 1;
            }
        }

        for (sector, (sum, count)) in sums {
            rows.push(SectorSpeedRow {
                session_key: *session_key,
                driver_number: *driver_number,
                lap_number,
                sector,
                avg_speed: KilometersPerHour(sum / count as f64),
            });
        }
    }

    warn_data_quality("best_lap_sector_speed", &dq);
    Ok(rows)
}

// ============================================================================
// Report 2: mean instantaneous acceleration per sector
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SectorAccelerationRow {
    pub driver_number: u32,
    pub session_key: u32,
    pub sector: Sector,
    pub avg_acceleration: MetersPerSecondSquared,
}

/// Mean instantaneous acceleration grouped by (driver, session, sector).
///
/// Acceleration is computed over each driver's full ordered sample stream,
/// then grouped by the sector the sample fell into; unsectored samples are
/// excluded from the grouping. Rows are ordered descending by the mean,
/// ties ascending by driver number.
pub fn sector_acceleration(
    store: &dyn RecordStore,
    filter: &SessionFilter,
) -> Result<Vec<SectorAccelerationRow>, ReportError> {
    let grouped = laps_by_driver(store.laps_for_session(filter)?);

    let mut rows = Vec::new();
    let mut dq = DataQuality::default();

    for ((session_key, driver_number), driver_laps) in grouped {
        let telemetry = store.telemetry_for_driver(session_key, driver_number)?;
        let attribution = attribute_sectors(&telemetry, &driver_laps);
        let (accelerations, out_of_order) = instantaneous_accelerations(&attribution.samples);

        dq.out_of_order_pairs += out_of_order;
        dq.outside_samples += attribution.outside_samples;
        dq.skipped_laps += attribution.skipped_laps;

        let mut sums: BTreeMap<Sector, (f64, usize)> = BTreeMap::new();
        for (sample, accel) in attribution.samples.iter().zip(&accelerations) {
            if let (Some(sector), Some(a)) = (sample.sector, accel) {
                let entry = sums.entry(sector).or_insert((0.0, 0));
                entry.0 += a;
                entry.1 += 1;
            }
        }

        for (sector, (sum, count)) in sums {
            rows.push(SectorAccelerationRow {
                driver_number,
                session_key,
                sector,
                avg_acceleration: MetersPerSecondSquared(sum / count as f64),
            });
        }
    }

    rows.sort_by(|a, b| {
        b.avg_acceleration
            .partial_cmp(&a.avg_acceleration)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.driver_number.cmp(&b.driver_number))
    });

    warn_data_quality("sector_acceleration", &dq);
    Ok(rows)
}

// ============================================================================
// Report 3: tyre compound vs track temperature
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TyreTemperatureRow {
    pub compound: String,
    pub avg_track_temperature: Celsius,
    pub max_stint_laps: u32,
}

#[derive(Default)]
struct CompoundAcc {
    temp_sum: f64,
    temp_count: usize,
    max_span: u32,
}

/// Per compound: mean track temperature over the stint-weather join and the
/// longest stint in laps.
///
/// Each stint joins every weather observation of its session, so sessions
/// with more stints on a compound weigh its temperature average more.
/// Stints in sessions without weather data drop out of the join entirely.
/// Rows are ordered descending by the longest stint.
pub fn tyre_temperature(
    store: &dyn RecordStore,
    filter: &SessionFilter,
) -> Result<Vec<TyreTemperatureRow>, ReportError> {
    let sessions = store.sessions()?;

    let mut by_compound: BTreeMap<String, CompoundAcc> = BTreeMap::new();

    for session in sessions.iter().filter(|s| filter.matches(s)) {
        let stints = store.tyre_stints_for_session(session.session_key)?;
        if stints.is_empty() {
            continue;
        }
        let weather = store.weather_for_session(session.session_key)?;
        if weather.is_empty() {
            continue;
        }

        let temp_sum: f64 = weather.iter().map(|w| w.track_temperature).sum();
        let temp_count = weather.len();

        for stint in &stints {
            let acc = by_compound.entry(stint.compound.clone()).or_default();
            acc.temp_sum += temp_sum;
            acc.temp_count += temp_count;
            acc.max_span = acc.max_span.max(stint.lap_span());
        }
    }

    let mut rows: Vec<TyreTemperatureRow> = by_compound
        .into_iter()
        .map(|(compound, acc)| TyreTemperatureRow {
            compound,
            avg_track_temperature: Celsius(acc.temp_sum / acc.temp_count as f64),
            max_stint_laps: acc.max_span,
        })
        .collect();

    // Stable sort keeps ties in compound order
    rows.sort_by(|a, b| b.max_stint_laps.cmp(&a.max_stint_laps));

    Ok(rows)
}

// ============================================================================
// Report 4: DRS state runs with start/end speed
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DrsRunRow {
    pub session_key: u32,
    pub circuit: String,
    pub driver_number: u32,
    pub driver: String,
    pub run_index: usize,
    pub sector: Sector,
    pub drs: DrsState,
    pub brake: BrakeState,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_speed: KilometersPerHour,
    pub end_speed: KilometersPerHour,
    pub speed_delta: KilometersPerHour,
}

/// Every detected (DRS, brake, sector) state run for a session, with the
/// speed carried at the run's edges, joined to driver and circuit names.
///
/// Rows are ordered by driver number, then run start.
pub fn drs_runs(
    store: &dyn RecordStore,
    session_key: u32,
) -> Result<Vec<DrsRunRow>, ReportError> {
    let Some(session) = store.session(session_key)? else {
        return Ok(Vec::new());
    };
    let drivers = store.drivers_for_session(session_key)?;
    let grouped = laps_by_driver(store.laps_for_session(&SessionFilter::key(session_key))?);

    let mut rows = Vec::new();
    let mut dq = DataQuality::default();

    for driver in &drivers {
        let telemetry = store.telemetry_for_driver(session_key, driver.driver_number)?;
        let empty = Vec::new();
        let driver_laps = grouped
            .get(&(session_key, driver.driver_number))
            .unwrap_or(&empty);

        let attribution = attribute_sectors(&telemetry, driver_laps);
        dq.outside_samples += attribution.outside_samples;
        dq.skipped_laps += attribution.skipped_laps;

        for run in detect_runs(&attribution.samples) {
            rows.push(DrsRunRow {
                session_key,
                circuit: session.circuit_short_name.clone(),
                driver_number: driver.driver_number,
                driver: driver.display_name(),
                run_index: run.index,
                sector: run.sector,
                drs: run.drs,
                brake: run.brake,
                start_time: run.start,
                end_time: run.end,
                start_speed: KilometersPerHour(run.start_speed),
                end_speed: KilometersPerHour(run.end_speed),
                speed_delta: KilometersPerHour(run.end_speed - run.start_speed),
            });
        }
    }

    warn_data_quality("drs_runs", &dq);
    Ok(rows)
}

// ============================================================================
// Report 5: engine usage vs track temperature
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EngineTemperatureRow {
    pub circuit: String,
    pub driver_number: u32,
    pub driver: String,
    pub avg_speed: KilometersPerHour,
    pub avg_throttle: Percent,
    pub avg_track_temperature: Celsius,
}

/// Whole-session mean speed and throttle per driver, alongside the
/// session's mean track temperature, keyed by circuit.
///
/// These averages deliberately span the full sample stream, sectored or
/// not. Drivers without telemetry are omitted; a session without weather
/// yields no rows (the temperature join is empty). Rows are ordered by
/// driver number.
pub fn engine_temperature(
    store: &dyn RecordStore,
    session_key: u32,
) -> Result<Vec<EngineTemperatureRow>, ReportError> {
    let Some(session) = store.session(session_key)? else {
        return Ok(Vec::new());
    };

    let weather = store.weather_for_session(session_key)?;
    let Some(avg_track_temp) = mean(weather.iter().map(|w| w.track_temperature)) else {
        return Ok(Vec::new());
    };

    let drivers = store.drivers_for_session(session_key)?;
    let mut rows = Vec::new();

    for driver in &drivers {
        let telemetry = store.telemetry_for_driver(session_key, driver.driver_number)?;
        if telemetry.is_empty() {
            continue;
        }

        let count = telemetry.len() as f64;
        let speed_sum: f64 = telemetry.iter().map(|s| s.speed).sum();
        let throttle_sum: f64 = telemetry.iter().map(|s| s.throttle).sum();

        rows.push(EngineTemperatureRow {
            circuit: session.circuit_short_name.clone(),
            driver_number: driver.driver_number,
            driver: driver.display_name(),
            avg_speed: KilometersPerHour(speed_sum / count),
            avg_throttle: Percent(throttle_sum / count),
            avg_track_temperature: Celsius(avg_track_temp),
        });
    }

    Ok(rows)
}
