//! CSV bulk loader
//!
//! Reads the flat columnar export files (one per table) into a
//! `MemoryStore`. A malformed row is dropped with a warning and counted; a
//! missing file marks its table unavailable so queries over it fail loudly
//! while the rest of the store keeps working. Only an unreadable data
//! directory is fatal.

use crate::memory::{MemoryStore, Table};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use pitwall_core::model::{
    Driver, Lap, PitStop, Session, TelemetrySample, TyreStint, WeatherSample,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;

/// Row counters for one loaded table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub read: usize,
    pub kept: usize,
    pub skipped: usize,
}

/// Per-table load outcome; None means the file was missing
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadStats {
    pub sessions: Option<TableStats>,
    pub drivers: Option<TableStats>,
    pub laps: Option<TableStats>,
    pub telemetry: Option<TableStats>,
    pub weather: Option<TableStats>,
    pub stints: Option<TableStats>,
    pub pits: Option<TableStats>,
}

impl LoadStats {
    pub fn total_kept(&self) -> usize {
        [
            self.sessions,
            self.drivers,
            self.laps,
            self.telemetry,
            self.weather,
            self.stints,
            self.pits,
        ]
        .iter()
        .flatten()
        .map(|s| s.kept)
        .sum()
    }

    pub fn total_skipped(&self) -> usize {
        [
            self.sessions,
            self.drivers,
            self.laps,
            self.telemetry,
            self.weather,
            self.stints,
            self.pits,
        ]
        .iter()
        .flatten()
        .map(|s| s.skipped)
        .sum()
    }
}

/// Deserialize one CSV table, converting raw rows and dropping the ones
/// that fail to parse or lack key fields.
fn read_table<R, Raw, T, F>(rdr: R, table: &'static str, convert: F) -> (Vec<T>, TableStats)
where
    R: io::Read,
    Raw: DeserializeOwned,
    F: Fn(Raw) -> Option<T>,
{
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    let mut stats = TableStats::default();

    for record in reader.deserialize::<Raw>() {
        stats.read += 1;
        match record {
            Ok(raw) => match convert(raw) {
                Some(row) => {
                    rows.push(row);
                    stats.kept += 1;
                }
                None => {
                    stats.skipped += 1;
                    tracing::warn!(table, row = stats.read, "dropping row with missing key fields");
                }
            },
            Err(e) => {
                stats.skipped += 1;
                tracing::warn!(table, row = stats.read, error = %e, "dropping malformed row");
            }
        }
    }

    (rows, stats)
}

fn open_table(dir: &Path, name: &str) -> Result<Option<File>> {
    let path = dir.join(name);
    if !path.exists() {
        tracing::warn!(path = %path.display(), "data file missing; table will be unavailable");
        return Ok(None);
    }
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    Ok(Some(file))
}

/// Load every table file from a directory into a fresh store.
pub fn load_dir(dir: &Path) -> Result<(MemoryStore, LoadStats)> {
    if !dir.is_dir() {
        bail!(
            "data directory {} does not exist or is not a directory",
            dir.display()
        );
    }

    let mut store = MemoryStore::new();
    let mut stats = LoadStats::default();

    match open_table(dir, "sessions.csv")? {
        Some(f) => {
            let (rows, st) = read_table(f, "sessions", SessionRow::into_model);
            store.ingest_sessions(rows);
            stats.sessions = Some(st);
        }
        None => store.mark_missing(Table::Sessions),
    }

    match open_table(dir, "drivers.csv")? {
        Some(f) => {
            let (rows, st) = read_table(f, "drivers", DriverRow::into_model);
            store.ingest_drivers(rows);
            stats.drivers = Some(st);
        }
        None => store.mark_missing(Table::Drivers),
    }

    match open_table(dir, "laps.csv")? {
        Some(f) => {
            let (rows, st) = read_table(f, "laps", LapRow::into_model);
            store.ingest_laps(rows);
            stats.laps = Some(st);
        }
        None => store.mark_missing(Table::Laps),
    }

    match open_table(dir, "telemetry.csv")? {
        Some(f) => {
            let (rows, st) = read_table(f, "telemetry", TelemetryRow::into_model);
            store.ingest_telemetry(rows);
            stats.telemetry = Some(st);
        }
        None => store.mark_missing(Table::Telemetry),
    }

    match open_table(dir, "weather.csv")? {
        Some(f) => {
            let (rows, st) = read_table(f, "weather", WeatherRow::into_model);
            store.ingest_weather(rows);
            stats.weather = Some(st);
        }
        None => store.mark_missing(Table::Weather),
    }

    match open_table(dir, "stints.csv")? {
        Some(f) => {
            let (rows, st) = read_table(f, "stints", StintRow::into_model);
            store.ingest_stints(rows);
            stats.stints = Some(st);
        }
        None => store.mark_missing(Table::Stints),
    }

    match open_table(dir, "pits.csv")? {
        Some(f) => {
            let (rows, st) = read_table(f, "pits", PitRow::into_model);
            store.ingest_pits(rows);
            stats.pits = Some(st);
        }
        None => store.mark_missing(Table::Pits),
    }

    tracing::info!(
        kept = stats.total_kept(),
        skipped = stats.total_skipped(),
        "bulk load finished"
    );

    Ok((store, stats))
}

// ============================================================================
// Raw CSV rows
//
// Every field is optional at parse time; conversion decides which fields a
// row cannot live without. This keeps one half-empty row from poisoning
// the whole file.
// ============================================================================

#[derive(Debug, Deserialize)]
struct SessionRow {
    session_key: Option<u32>,
    session_name: Option<String>,
    session_type: Option<String>,
    circuit_short_name: Option<String>,
    country_name: Option<String>,
    date_start: Option<DateTime<Utc>>,
    date_end: Option<DateTime<Utc>>,
    year: Option<i32>,
}

impl SessionRow {
    fn into_model(self) -> Option<Session> {
        Some(Session {
            session_key: self.session_key?,
            session_name: self.session_name.unwrap_or_default(),
            session_type: self.session_type,
            circuit_short_name: self.circuit_short_name.unwrap_or_default(),
            country_name: self.country_name,
            date_start: self.date_start,
            date_end: self.date_end,
            year: self.year,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DriverRow {
    driver_number: Option<u32>,
    session_key: Option<u32>,
    full_name: Option<String>,
    name_acronym: Option<String>,
    team_name: Option<String>,
    country_code: Option<String>,
}

impl DriverRow {
    fn into_model(self) -> Option<Driver> {
        Some(Driver {
            driver_number: self.driver_number?,
            session_key: self.session_key?,
            full_name: self.full_name,
            name_acronym: self.name_acronym,
            team_name: self.team_name,
            country_code: self.country_code,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LapRow {
    session_key: Option<u32>,
    driver_number: Option<u32>,
    lap_number: Option<u32>,
    date_start: Option<DateTime<Utc>>,
    duration_sector_1: Option<f64>,
    duration_sector_2: Option<f64>,
    duration_sector_3: Option<f64>,
    lap_duration: Option<f64>,
    is_pit_out_lap: Option<bool>,
    i1_speed: Option<f64>,
    i2_speed: Option<f64>,
    st_speed: Option<f64>,
}

impl LapRow {
    fn into_model(self) -> Option<Lap> {
        Some(Lap {
            session_key: self.session_key?,
            driver_number: self.driver_number?,
            lap_number: self.lap_number,
            date_start: self.date_start,
            duration_sector_1: self.duration_sector_1,
            duration_sector_2: self.duration_sector_2,
            duration_sector_3: self.duration_sector_3,
            lap_duration: self.lap_duration,
            is_pit_out_lap: self.is_pit_out_lap.unwrap_or(false),
            i1_speed: self.i1_speed,
            i2_speed: self.i2_speed,
            st_speed: self.st_speed,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TelemetryRow {
    session_key: Option<u32>,
    driver_number: Option<u32>,
    date: Option<DateTime<Utc>>,
    speed: Option<f64>,
    rpm: Option<i32>,
    n_gear: Option<i8>,
    throttle: Option<f64>,
    brake: Option<i32>,
    drs: Option<i32>,
}

impl TelemetryRow {
    fn into_model(self) -> Option<TelemetrySample> {
        Some(TelemetrySample {
            session_key: self.session_key?,
            driver_number: self.driver_number?,
            date: self.date?,
            speed: self.speed?,
            rpm: self.rpm.unwrap_or(0),
            n_gear: self.n_gear.unwrap_or(0),
            throttle: self.throttle.unwrap_or(0.0),
            brake: self.brake.unwrap_or(0),
            drs: self.drs.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WeatherRow {
    session_key: Option<u32>,
    date: Option<DateTime<Utc>>,
    air_temperature: Option<f64>,
    track_temperature: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    rainfall: Option<bool>,
    wind_direction: Option<f64>,
    wind_speed: Option<f64>,
}

impl WeatherRow {
    fn into_model(self) -> Option<WeatherSample> {
        Some(WeatherSample {
            session_key: self.session_key?,
            date: self.date?,
            air_temperature: self.air_temperature?,
            track_temperature: self.track_temperature?,
            humidity: self.humidity.unwrap_or(0.0),
            pressure: self.pressure.unwrap_or(0.0),
            rainfall: self.rainfall.unwrap_or(false),
            wind_direction: self.wind_direction.unwrap_or(0.0),
            wind_speed: self.wind_speed.unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StintRow {
    session_key: Option<u32>,
    driver_number: Option<u32>,
    stint_number: Option<u32>,
    lap_start: Option<u32>,
    lap_end: Option<u32>,
    compound: Option<String>,
    tyre_age_at_start: Option<u32>,
}

impl StintRow {
    fn into_model(self) -> Option<TyreStint> {
        Some(TyreStint {
            session_key: self.session_key?,
            driver_number: self.driver_number?,
            stint_number: self.stint_number?,
            lap_start: self.lap_start?,
            lap_end: self.lap_end?,
            compound: self.compound?,
            tyre_age_at_start: self.tyre_age_at_start.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PitRow {
    session_key: Option<u32>,
    driver_number: Option<u32>,
    date: Option<DateTime<Utc>>,
    lap_number: Option<u32>,
    pit_duration: Option<f64>,
}

impl PitRow {
    fn into_model(self) -> Option<PitStop> {
        Some(PitStop {
            session_key: self.session_key?,
            driver_number: self.driver_number?,
            date: self.date,
            lap_number: self.lap_number?,
            pit_duration: self.pit_duration,
        })
    }
}
