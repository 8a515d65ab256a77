//! In-memory record store
//!
//! Holds every ingested table as a sorted, deduplicated Vec and answers the
//! `RecordStore` queries by filtering and cloning. Queries return owned
//! data, so concurrent report computations never share mutable state.
//!
//! Dedup keeps the first-ingested row for a natural key; later duplicates
//! are dropped, matching the bulk-load contract.

use pitwall_core::model::{
    Driver, Lap, PitStop, Session, TelemetrySample, TyreStint, WeatherSample,
};
use pitwall_core::store::{RecordStore, SessionFilter, StoreError};
use std::cmp::Ordering;
use std::collections::HashSet;

/// The ingestable tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Sessions,
    Drivers,
    Laps,
    Telemetry,
    Weather,
    Stints,
    Pits,
}

/// In-memory `RecordStore` backed by sorted Vecs
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Vec<Session>,
    drivers: Vec<Driver>,
    laps: Vec<Lap>,
    telemetry: Vec<TelemetrySample>,
    weather: Vec<WeatherSample>,
    stints: Vec<TyreStint>,
    pits: Vec<PitStop>,
    missing: HashSet<Table>,
}

impl MemoryStore {
    /// An empty store with every table present (and empty).
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a table as never loaded. Queries over it will fail with
    /// `StoreError::Unavailable` instead of answering from emptiness.
    pub fn mark_missing(&mut self, table: Table) {
        self.missing.insert(table);
    }

    fn ensure(&self, table: Table, query: &'static str) -> Result<(), StoreError> {
        if self.missing.contains(&table) {
            Err(StoreError::unavailable(
                query,
                format!("{table:?} table was not loaded"),
            ))
        } else {
            Ok(())
        }
    }

    pub fn ingest_sessions(&mut self, rows: Vec<Session>) {
        self.sessions.extend(rows);
        let mut seen = HashSet::new();
        self.sessions.retain(|s| seen.insert(s.session_key));
        self.sessions.sort_by_key(|s| s.session_key);
    }

    pub fn ingest_drivers(&mut self, rows: Vec<Driver>) {
        self.drivers.extend(rows);
        let mut seen = HashSet::new();
        self.drivers
            .retain(|d| seen.insert((d.session_key, d.driver_number)));
        self.drivers
            .sort_by_key(|d| (d.session_key, d.driver_number));
    }

    pub fn ingest_laps(&mut self, rows: Vec<Lap>) {
        self.laps.extend(rows);
        let mut seen = HashSet::new();
        self.laps
            .retain(|l| seen.insert((l.session_key, l.driver_number, l.lap_number)));
        // Laps are served ordered by driver then lap_duration ascending,
        // null durations last; the best-lap selection relies on this only
        // loosely, but the contract is part of the trait.
        self.laps.sort_by(|a, b| {
            (a.session_key, a.driver_number)
                .cmp(&(b.session_key, b.driver_number))
                .then_with(|| cmp_f64_nulls_last(a.lap_duration, b.lap_duration))
                .then_with(|| {
                    a.lap_number
                        .unwrap_or(u32::MAX)
                        .cmp(&b.lap_number.unwrap_or(u32::MAX))
                })
        });
    }

    pub fn ingest_telemetry(&mut self, rows: Vec<TelemetrySample>) {
        self.telemetry.extend(rows);
        let mut seen = HashSet::new();
        self.telemetry
            .retain(|t| seen.insert((t.session_key, t.driver_number, t.date)));
        self.telemetry
            .sort_by_key(|t| (t.session_key, t.driver_number, t.date));
    }

    pub fn ingest_weather(&mut self, rows: Vec<WeatherSample>) {
        self.weather.extend(rows);
        let mut seen = HashSet::new();
        self.weather.retain(|w| seen.insert((w.session_key, w.date)));
        self.weather.sort_by_key(|w| (w.session_key, w.date));
    }

    pub fn ingest_stints(&mut self, rows: Vec<TyreStint>) {
        self.stints.extend(rows);
        let mut seen = HashSet::new();
        self.stints
            .retain(|s| seen.insert((s.session_key, s.driver_number, s.stint_number)));
        self.stints
            .sort_by_key(|s| (s.session_key, s.driver_number, s.stint_number));
    }

    pub fn ingest_pits(&mut self, rows: Vec<PitStop>) {
        self.pits.extend(rows);
        let mut seen = HashSet::new();
        self.pits
            .retain(|p| seen.insert((p.session_key, p.driver_number, p.lap_number)));
        self.pits
            .sort_by_key(|p| (p.session_key, p.driver_number, p.lap_number));
    }

    /// Pit stops for a session, ordered by (driver_number, lap_number).
    pub fn pit_stops_for_session(&self, session_key: u32) -> Result<Vec<PitStop>, StoreError> {
        self.ensure(Table::Pits, "pit_stops_for_session")?;
        Ok(self
            .pits
            .iter()
            .filter(|p| p.session_key == session_key)
            .cloned()
            .collect())
    }
}

fn cmp_f64_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::INFINITY)
        .partial_cmp(&b.unwrap_or(f64::INFINITY))
        .unwrap_or(Ordering::Equal)
}

impl RecordStore for MemoryStore {
    fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.ensure(Table::Sessions, "sessions")?;
        Ok(self.sessions.clone())
    }

    fn session(&self, session_key: u32) -> Result<Option<Session>, StoreError> {
        self.ensure(Table::Sessions, "session")?;
        Ok(self
            .sessions
            .iter()
            .find(|s| s.session_key == session_key)
            .cloned())
    }

    fn drivers_for_session(&self, session_key: u32) -> Result<Vec<Driver>, StoreError> {
        self.ensure(Table::Drivers, "drivers_for_session")?;
        Ok(self
            .drivers
            .iter()
            .filter(|d| d.session_key == session_key)
            .cloned()
            .collect())
    }

    fn laps_for_session(&self, filter: &SessionFilter) -> Result<Vec<Lap>, StoreError> {
        self.ensure(Table::Sessions, "laps_for_session")?;
        self.ensure(Table::Laps, "laps_for_session")?;
        let keys: HashSet<u32> = self
            .sessions
            .iter()
            .filter(|s| filter.matches(s))
            .map(|s| s.session_key)
            .collect();
        Ok(self
            .laps
            .iter()
            .filter(|l| keys.contains(&l.session_key))
            .cloned()
            .collect())
    }

    fn telemetry_for_driver(
        &self,
        session_key: u32,
        driver_number: u32,
    ) -> Result<Vec<TelemetrySample>, StoreError> {
        self.ensure(Table::Telemetry, "telemetry_for_driver")?;
        Ok(self
            .telemetry
            .iter()
            .filter(|t| t.session_key == session_key && t.driver_number == driver_number)
            .cloned()
            .collect())
    }

    fn weather_for_session(&self, session_key: u32) -> Result<Vec<WeatherSample>, StoreError> {
        self.ensure(Table::Weather, "weather_for_session")?;
        Ok(self
            .weather
            .iter()
            .filter(|w| w.session_key == session_key)
            .cloned()
            .collect())
    }

    fn tyre_stints_for_session(&self, session_key: u32) -> Result<Vec<TyreStint>, StoreError> {
        self.ensure(Table::Stints, "tyre_stints_for_session")?;
        Ok(self
            .stints
            .iter()
            .filter(|s| s.session_key == session_key)
            .cloned()
            .collect())
    }
}
