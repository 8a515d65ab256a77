//! Integration tests for the pitwall-server HTTP API
//!
//! Uses tower::ServiceExt::oneshot to test routes directly without binding
//! a port.

use axum::body::Body;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use hyper::Request;
use pitwall_core::model::{Driver, Lap, Session, TelemetrySample, TyreStint, WeatherSample};
use pitwall_server::{api::create_router, state::AppState};
use pitwall_store::{MemoryStore, Table};
use std::sync::Arc;
use tower::ServiceExt;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn session(key: u32, name: &str) -> Session {
    Session {
        session_key: key,
        session_name: name.to_string(),
        session_type: Some(name.to_string()),
        circuit_short_name: "Monza".to_string(),
        country_name: Some("Italy".to_string()),
        date_start: Some(ts("2024-05-26T13:00:00Z")),
        date_end: Some(ts("2024-05-26T15:00:00Z")),
        year: Some(2024),
    }
}

fn driver(number: u32, name: &str) -> Driver {
    Driver {
        driver_number: number,
        session_key: 9998,
        full_name: Some(name.to_string()),
        name_acronym: None,
        team_name: None,
        country_code: None,
    }
}

fn lap(driver_number: u32, number: u32, start: &str, d1: f64, d2: f64, d3: f64) -> Lap {
    Lap {
        session_key: 9998,
        driver_number,
        lap_number: Some(number),
        date_start: Some(ts(start)),
        duration_sector_1: Some(d1),
        duration_sector_2: Some(d2),
        duration_sector_3: Some(d3),
        lap_duration: Some(d1 + d2 + d3),
        is_pit_out_lap: false,
        i1_speed: None,
        i2_speed: None,
        st_speed: None,
    }
}

fn sample(driver_number: u32, date: &str, speed: f64, drs: i32) -> TelemetrySample {
    TelemetrySample {
        session_key: 9998,
        driver_number,
        date: ts(date),
        speed,
        rpm: 11000,
        n_gear: 7,
        throttle: 80.0,
        brake: 0,
        drs,
    }
}

fn weather(date: &str, track_temp: f64) -> WeatherSample {
    WeatherSample {
        session_key: 9998,
        date: ts(date),
        air_temperature: 25.0,
        track_temperature: track_temp,
        humidity: 40.0,
        pressure: 1013.0,
        rainfall: false,
        wind_direction: 180.0,
        wind_speed: 2.0,
    }
}

fn stint(driver_number: u32, number: u32, compound: &str, start: u32, end: u32) -> TyreStint {
    TyreStint {
        session_key: 9998,
        driver_number,
        stint_number: number,
        lap_start: start,
        lap_end: end,
        compound: compound.to_string(),
        tyre_age_at_start: 0,
    }
}

/// A small race weekend: one session, two drivers, enough telemetry to
/// drive every report.
fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.ingest_sessions(vec![session(9998, "Race")]);
    store.ingest_drivers(vec![driver(1, "Max Verstappen"), driver(16, "Charles Leclerc")]);
    store.ingest_laps(vec![
        lap(1, 1, "2024-05-26T13:00:00Z", 30.0, 25.0, 20.0),
        // Best lap for driver 1
        lap(1, 2, "2024-05-26T13:01:15Z", 29.0, 24.0, 19.0),
        lap(16, 1, "2024-05-26T13:00:00Z", 31.0, 26.0, 21.0),
    ]);
    store.ingest_telemetry(vec![
        // Driver 1, lap 2: DRS on, on, off in sector 1, then off in sector 2
        sample(1, "2024-05-26T13:01:20Z", 200.0, 12),
        sample(1, "2024-05-26T13:01:30Z", 240.0, 12),
        sample(1, "2024-05-26T13:01:40Z", 250.0, 0),
        sample(1, "2024-05-26T13:01:50Z", 260.0, 0),
        // Driver 16, lap 1 sector 1
        sample(16, "2024-05-26T13:00:10Z", 210.0, 0),
    ]);
    store.ingest_weather(vec![
        weather("2024-05-26T13:00:00Z", 40.0),
        weather("2024-05-26T13:10:00Z", 44.0),
    ]);
    store.ingest_stints(vec![
        stint(1, 1, "HARD", 1, 11),
        stint(16, 1, "HARD", 5, 20),
        stint(1, 2, "SOFT", 11, 13),
    ]);
    store
}

fn app() -> axum::Router {
    create_router(AppState::new(Arc::new(seeded_store())))
}

async fn get_json(app: axum::Router, uri: &str) -> (u16, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status().as_u16();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };
    (status, value)
}

// ==================== Listings ====================

#[tokio::test]
async fn test_list_sessions() {
    let (status, body) = get_json(app(), "/api/sessions").await;
    assert_eq!(status, 200);
    let sessions = body.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["session_name"], "Race");
    assert_eq!(sessions[0]["circuit_short_name"], "Monza");
}

#[tokio::test]
async fn test_list_drivers_for_session() {
    let (status, body) = get_json(app(), "/api/drivers?session_key=9998").await;
    assert_eq!(status, 200);
    let drivers = body.as_array().unwrap();
    assert_eq!(drivers.len(), 2);
    assert_eq!(drivers[0]["driver_number"], 1);
    assert_eq!(drivers[1]["full_name"], "Charles Leclerc");
}

#[tokio::test]
async fn test_list_drivers_requires_session_key() {
    let (status, _) = get_json(app(), "/api/drivers").await;
    assert_eq!(status, 400);
}

// ==================== Reports ====================

#[tokio::test]
async fn test_sector_speed_report() {
    let (status, body) = get_json(app(), "/api/reports/sector-speed").await;
    assert_eq!(status, 200);
    let rows = body.as_array().unwrap();
    // Driver 1: sectors 1 and 2 of the best lap; driver 16: sector 1
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0]["driver_number"], 1);
    assert_eq!(rows[0]["lap_number"], 2);
    assert_eq!(rows[0]["sector"], "Sector1");
    assert_eq!(rows[0]["avg_speed"], serde_json::json!(230.0));
    assert_eq!(rows[1]["sector"], "Sector2");
    assert_eq!(rows[1]["avg_speed"], serde_json::json!(260.0));
    assert_eq!(rows[2]["driver_number"], 16);
}

#[tokio::test]
async fn test_sector_acceleration_report() {
    let (status, body) = get_json(app(), "/api/reports/sector-acceleration").await;
    assert_eq!(status, 200);
    assert!(body.as_array().is_some());
}

#[tokio::test]
async fn test_tyre_temperature_report() {
    let (status, body) = get_json(app(), "/api/reports/tyre-temperature").await;
    assert_eq!(status, 200);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // Longest stint first
    assert_eq!(rows[0]["compound"], "HARD");
    assert_eq!(rows[0]["max_stint_laps"], 15);
    assert_eq!(rows[0]["avg_track_temperature"], serde_json::json!(42.0));
    assert_eq!(rows[1]["compound"], "SOFT");
}

#[tokio::test]
async fn test_drs_runs_report() {
    let (status, body) = get_json(app(), "/api/reports/drs-runs?session_key=9998").await;
    assert_eq!(status, 200);
    let rows = body.as_array().unwrap();
    // Driver 1: active run (2 samples), inactive in sector 1, inactive in
    // sector 2; driver 16: one run
    assert_eq!(rows.len(), 4);

    assert_eq!(rows[0]["driver"], "Max Verstappen");
    assert_eq!(rows[0]["drs"], "Active");
    assert_eq!(rows[0]["start_speed"], serde_json::json!(200.0));
    assert_eq!(rows[0]["end_speed"], serde_json::json!(240.0));
    assert_eq!(rows[0]["speed_delta"], serde_json::json!(40.0));
    assert_eq!(rows[0]["circuit"], "Monza");
    assert_eq!(rows[3]["driver_number"], 16);
}

#[tokio::test]
async fn test_drs_runs_unknown_session_is_empty() {
    let (status, body) = get_json(app(), "/api/reports/drs-runs?session_key=1234").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_engine_temperature_report() {
    let (status, body) = get_json(app(), "/api/reports/engine-temperature?session_key=9998").await;
    assert_eq!(status, 200);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["driver_number"], 1);
    assert_eq!(rows[0]["avg_speed"], serde_json::json!(237.5));
    assert_eq!(rows[0]["avg_throttle"], serde_json::json!(80.0));
    assert_eq!(rows[0]["avg_track_temperature"], serde_json::json!(42.0));
    assert_eq!(rows[0]["circuit"], "Monza");
}

// ==================== Failure modes ====================

#[tokio::test]
async fn test_missing_table_yields_503_naming_the_query() {
    let mut store = seeded_store();
    store.mark_missing(Table::Telemetry);
    let app = create_router(AppState::new(Arc::new(store)));

    let (status, body) = get_json(app, "/api/reports/sector-speed").await;
    assert_eq!(status, 503);
    assert!(body.as_str().unwrap().contains("telemetry_for_driver"));
}

#[tokio::test]
async fn test_bad_session_key_is_rejected() {
    let (status, _) = get_json(app(), "/api/reports/drs-runs?session_key=abc").await;
    assert_eq!(status, 400);
}
