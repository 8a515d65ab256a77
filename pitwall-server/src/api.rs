//! REST API routes

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pitwall_core::model::{Driver, Session};
use pitwall_core::reports::{
    self, DrsRunRow, EngineTemperatureRow, ReportError, SectorAccelerationRow, SectorSpeedRow,
    TyreTemperatureRow,
};
use pitwall_core::store::{SessionFilter, StoreError};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", get(list_sessions))
        .route("/api/drivers", get(list_drivers))
        .route("/api/reports/sector-speed", get(sector_speed))
        .route("/api/reports/sector-acceleration", get(sector_acceleration))
        .route("/api/reports/tyre-temperature", get(tyre_temperature))
        .route("/api/reports/drs-runs", get(drs_runs))
        .route("/api/reports/engine-temperature", get(engine_temperature))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A store that cannot answer a query aborts the report; surface the
/// failing query to the client as 503.
fn store_unavailable(err: StoreError) -> (StatusCode, String) {
    tracing::error!(error = %err, "report aborted");
    (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
}

fn report_error(err: ReportError) -> (StatusCode, String) {
    match err {
        ReportError::Store(e) => store_unavailable(e),
    }
}

// === Scope query parameters ===

/// Optional session scoping shared by the race-wide reports
#[derive(Deserialize)]
struct SessionScope {
    session_key: Option<u32>,
    session_name: Option<String>,
}

impl SessionScope {
    /// Filter defaulting the session name to "Race".
    fn race_filter(self) -> SessionFilter {
        SessionFilter {
            session_key: self.session_key,
            session_name: Some(self.session_name.unwrap_or_else(|| "Race".to_string())),
        }
    }

    /// Filter with no defaults applied.
    fn filter(self) -> SessionFilter {
        SessionFilter {
            session_key: self.session_key,
            session_name: self.session_name,
        }
    }
}

/// Required session key for the per-session reports
#[derive(Deserialize)]
struct SessionKeyQuery {
    session_key: u32,
}

// === Listing endpoints ===

async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Session>>, (StatusCode, String)> {
    state.store.sessions().map(Json).map_err(store_unavailable)
}

async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<SessionKeyQuery>,
) -> Result<Json<Vec<Driver>>, (StatusCode, String)> {
    state
        .store
        .drivers_for_session(query.session_key)
        .map(Json)
        .map_err(store_unavailable)
}

// === Report endpoints ===

async fn sector_speed(
    State(state): State<AppState>,
    Query(scope): Query<SessionScope>,
) -> Result<Json<Vec<SectorSpeedRow>>, (StatusCode, String)> {
    reports::best_lap_sector_speed(state.store.as_ref(), &scope.race_filter())
        .map(Json)
        .map_err(report_error)
}

async fn sector_acceleration(
    State(state): State<AppState>,
    Query(scope): Query<SessionScope>,
) -> Result<Json<Vec<SectorAccelerationRow>>, (StatusCode, String)> {
    reports::sector_acceleration(state.store.as_ref(), &scope.race_filter())
        .map(Json)
        .map_err(report_error)
}

async fn tyre_temperature(
    State(state): State<AppState>,
    Query(scope): Query<SessionScope>,
) -> Result<Json<Vec<TyreTemperatureRow>>, (StatusCode, String)> {
    reports::tyre_temperature(state.store.as_ref(), &scope.filter())
        .map(Json)
        .map_err(report_error)
}

async fn drs_runs(
    State(state): State<AppState>,
    Query(query): Query<SessionKeyQuery>,
) -> Result<Json<Vec<DrsRunRow>>, (StatusCode, String)> {
    reports::drs_runs(state.store.as_ref(), query.session_key)
        .map(Json)
        .map_err(report_error)
}

async fn engine_temperature(
    State(state): State<AppState>,
    Query(query): Query<SessionKeyQuery>,
) -> Result<Json<Vec<EngineTemperatureRow>>, (StatusCode, String)> {
    reports::engine_temperature(state.store.as_ref(), query.session_key)
        .map(Json)
        .map_err(report_error)
}
