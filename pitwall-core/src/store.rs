//! Record store trait definition

use crate::model::{Driver, Lap, Session, TelemetrySample, TyreStint, WeatherSample};
use thiserror::Error;

/// Error returned when the backing store cannot answer a query
///
/// Store failures are fatal to the report being computed; the failing query
/// is identified so the caller can surface it. Data-quality problems inside
/// otherwise-answerable result sets are NOT store errors; the pipeline
/// recovers from those locally.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store cannot answer `{query}`: {reason}")]
    Unavailable {
        query: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub fn unavailable(query: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            query,
            reason: reason.into(),
        }
    }
}

/// Restricts which sessions a query covers
///
/// Reports over race data default to `SessionFilter::race()`; an explicit
/// key narrows to a single session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub session_key: Option<u32>,
    pub session_name: Option<String>,
}

impl SessionFilter {
    /// Match every session.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match sessions named "Race".
    pub fn race() -> Self {
        Self {
            session_key: None,
            session_name: Some("Race".to_string()),
        }
    }

    /// Match a single session by key.
    pub fn key(session_key: u32) -> Self {
        Self {
            session_key: Some(session_key),
            session_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.session_name = Some(name.into());
        self
    }

    pub fn matches(&self, session: &Session) -> bool {
        if let Some(key) = self.session_key {
            if session.session_key != key {
                return false;
            }
        }
        if let Some(ref name) = self.session_name {
            if &session.session_name != name {
                return false;
            }
        }
        true
    }
}

/// Trait for typed read access to ingested timing records
///
/// A store is responsible for:
/// - Answering each query with a complete, materialized result set
/// - The documented result ordering (the pipeline's sweep algorithms
///   depend on it)
/// - Returning owned data so concurrent report computations never share
///   mutable state
pub trait RecordStore: Send + Sync {
    /// All ingested sessions, ordered by session_key.
    fn sessions(&self) -> Result<Vec<Session>, StoreError>;

    /// A single session by key, if ingested.
    fn session(&self, session_key: u32) -> Result<Option<Session>, StoreError>;

    /// Driver entries for a session, ordered by driver_number.
    fn drivers_for_session(&self, session_key: u32) -> Result<Vec<Driver>, StoreError>;

    /// Laps for every session matching the filter, ordered by
    /// (session_key, driver_number), then lap_duration ascending with
    /// null durations last.
    fn laps_for_session(&self, filter: &SessionFilter) -> Result<Vec<Lap>, StoreError>;

    /// Telemetry for one driver in one session, ordered by `date`
    /// ascending, unique per timestamp.
    fn telemetry_for_driver(
        &self,
        session_key: u32,
        driver_number: u32,
    ) -> Result<Vec<TelemetrySample>, StoreError>;

    /// Weather observations for a session, ordered by `date` ascending.
    fn weather_for_session(&self, session_key: u32) -> Result<Vec<WeatherSample>, StoreError>;

    /// Tyre stints for a session, ordered by (driver_number, stint_number).
    fn tyre_stints_for_session(&self, session_key: u32) -> Result<Vec<TyreStint>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(key: u32, name: &str) -> Session {
        Session {
            session_key: key,
            session_name: name.to_string(),
            session_type: None,
            circuit_short_name: "Monza".to_string(),
            country_name: None,
            date_start: None,
            date_end: None,
            year: Some(2024),
        }
    }

    #[test]
    fn test_filter_any_matches_everything() {
        let filter = SessionFilter::any();
        assert!(filter.matches(&session(1, "Race")));
        assert!(filter.matches(&session(2, "Qualifying")));
    }

    #[test]
    fn test_filter_race_matches_name_only() {
        let filter = SessionFilter::race();
        assert!(filter.matches(&session(1, "Race")));
        assert!(!filter.matches(&session(1, "Sprint")));
    }

    #[test]
    fn test_filter_key_and_name_compose() {
        let filter = SessionFilter::key(9998).with_name("Race");
        assert!(filter.matches(&session(9998, "Race")));
        assert!(!filter.matches(&session(9998, "Practice 1")));
        assert!(!filter.matches(&session(9999, "Race")));
    }

    #[test]
    fn test_store_error_names_failing_query() {
        let err = StoreError::unavailable("telemetry_for_driver", "table missing");
        let msg = err.to_string();
        assert!(msg.contains("telemetry_for_driver"));
        assert!(msg.contains("table missing"));
    }
}
