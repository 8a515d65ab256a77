//! F1 timing and telemetry record model
//!
//! Defines the entity types the record store hands out. All records are
//! created once by ingestion and read-only to the report pipeline. Fields
//! that are nullable in the source data use Option<T>; the pipeline is
//! expected to tolerate (and skip) incomplete rows rather than fail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timed session at a circuit (practice, qualifying, race...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for the session
    pub session_key: u32,

    /// Name of the session ("Practice 1", "Qualifying", "Race", ...)
    pub session_name: String,

    /// Type of the session ("Practice", "Qualifying", "Race", ...)
    pub session_type: Option<String>,

    /// Short or common name of the circuit
    pub circuit_short_name: String,

    /// Full name of the country hosting the session
    pub country_name: Option<String>,

    /// UTC start time
    pub date_start: Option<DateTime<Utc>>,

    /// UTC end time
    pub date_end: Option<DateTime<Utc>>,

    /// Year the event takes place
    pub year: Option<i32>,
}

/// A driver entry, unique per (driver_number, session_key)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    /// Race number on the car
    pub driver_number: u32,

    /// Session this entry belongs to
    pub session_key: u32,

    /// Driver's full name
    pub full_name: Option<String>,

    /// Three-letter acronym ("VER", "HAM", ...)
    pub name_acronym: Option<String>,

    /// Name of the driver's team
    pub team_name: Option<String>,

    /// Code identifying the driver's country
    pub country_code: Option<String>,
}

impl Driver {
    /// Display name: full name when present, otherwise acronym, otherwise
    /// the car number.
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.name_acronym.clone())
            .unwrap_or_else(|| format!("#{}", self.driver_number))
    }
}

/// One completed (or in-progress) lap for a driver
///
/// Sector durations sum only approximately to `lap_duration`; upstream does
/// not enforce the invariant and consumers must tolerate the drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lap {
    pub session_key: u32,
    pub driver_number: u32,

    /// Sequential lap number starting from 1; null for unstarted laps
    pub lap_number: Option<u32>,

    /// UTC time the lap started
    pub date_start: Option<DateTime<Utc>>,

    /// Time in seconds to complete the first sector
    pub duration_sector_1: Option<f64>,

    /// Time in seconds to complete the second sector
    pub duration_sector_2: Option<f64>,

    /// Time in seconds to complete the third sector
    pub duration_sector_3: Option<f64>,

    /// Total lap time in seconds
    pub lap_duration: Option<f64>,

    /// True if this lap is an out lap from the pit
    pub is_pit_out_lap: bool,

    /// Speed in km/h at the first intermediate point
    pub i1_speed: Option<f64>,

    /// Speed in km/h at the second intermediate point
    pub i2_speed: Option<f64>,

    /// Speed in km/h at the speed trap
    pub st_speed: Option<f64>,
}

/// A raw car telemetry sample
///
/// Unique and ascending by `date` within (session_key, driver_number);
/// duplicates are dropped at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub session_key: u32,
    pub driver_number: u32,

    /// UTC capture time
    pub date: DateTime<Utc>,

    /// Velocity of the car in km/h
    pub speed: f64,

    /// Engine revolutions per minute
    pub rpm: i32,

    /// Current gear selection, 0 = neutral
    pub n_gear: i8,

    /// Percentage of maximum engine power being used (0-100)
    pub throttle: f64,

    /// Whether the brake pedal is pressed (100) or not (0)
    pub brake: i32,

    /// Raw Drag Reduction System status code
    pub drs: i32,
}

/// A weather observation for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSample {
    pub session_key: u32,

    /// UTC observation time
    pub date: DateTime<Utc>,

    /// Air temperature in deg C
    pub air_temperature: f64,

    /// Track temperature in deg C
    pub track_temperature: f64,

    /// Relative humidity in %
    pub humidity: f64,

    /// Air pressure in mbar
    pub pressure: f64,

    /// Whether there is rainfall
    pub rainfall: bool,

    /// Wind direction in degrees, 0-359
    pub wind_direction: f64,

    /// Wind speed in m/s
    pub wind_speed: f64,
}

/// A continuous span of laps on one set of tyres
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TyreStint {
    pub session_key: u32,
    pub driver_number: u32,

    /// Sequential number of the stint within the session, starting at 1
    pub stint_number: u32,

    /// Number of the initial lap in this stint
    pub lap_start: u32,

    /// Number of the last completed lap in this stint
    pub lap_end: u32,

    /// Tyre compound ("SOFT", "MEDIUM", "HARD", ...)
    pub compound: String,

    /// Age of the tyres at the start of the stint, in laps completed
    pub tyre_age_at_start: u32,
}

impl TyreStint {
    /// Stint length in laps.
    pub fn lap_span(&self) -> u32 {
        self.lap_end.saturating_sub(self.lap_start)
    }
}

/// A pit stop event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitStop {
    pub session_key: u32,
    pub driver_number: u32,

    /// UTC time of the stop
    pub date: Option<DateTime<Utc>>,

    /// Lap on which the driver pitted
    pub lap_number: u32,

    /// Time spent in the pit lane in seconds
    pub pit_duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_display_name_prefers_full_name() {
        let driver = Driver {
            driver_number: 1,
            session_key: 9998,
            full_name: Some("Max Verstappen".to_string()),
            name_acronym: Some("VER".to_string()),
            team_name: None,
            country_code: None,
        };
        assert_eq!(driver.display_name(), "Max Verstappen");
    }

    #[test]
    fn test_driver_display_name_falls_back() {
        let driver = Driver {
            driver_number: 44,
            session_key: 9998,
            full_name: None,
            name_acronym: None,
            team_name: None,
            country_code: None,
        };
        assert_eq!(driver.display_name(), "#44");
    }

    #[test]
    fn test_stint_lap_span() {
        let stint = TyreStint {
            session_key: 9998,
            driver_number: 1,
            stint_number: 2,
            lap_start: 20,
            lap_end: 35,
            compound: "HARD".to_string(),
            tyre_age_at_start: 0,
        };
        assert_eq!(stint.lap_span(), 15);
    }

    #[test]
    fn test_telemetry_sample_serialization_roundtrip() {
        let sample = TelemetrySample {
            session_key: 9998,
            driver_number: 16,
            date: "2024-05-26T13:05:00Z".parse().unwrap(),
            speed: 287.0,
            rpm: 11250,
            n_gear: 7,
            throttle: 100.0,
            brake: 0,
            drs: 12,
        };
        let json = serde_json::to_string(&sample).unwrap();
        let back: TelemetrySample = serde_json::from_str(&json).unwrap();
        assert_eq!(back.driver_number, 16);
        assert_eq!(back.drs, 12);
        assert_eq!(back.date, sample.date);
    }
}
