//! Health, version and service info endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Module name reported by health and info
pub const MODULE_NAME: &str = "topper-api";

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub uptime_seconds: u64,
}

fn uptime_seconds(state: &AppState) -> u64 {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    uptime.num_seconds().max(0) as u64
}

/// GET /api/health
///
/// Not rate limited, so monitors can poll freely.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: MODULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(&state),
    })
}

/// GET /api/version
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/info
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: MODULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(&state),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}

/// Version and info routes (rate limited like the rest of the API)
pub fn info_routes() -> Router<AppState> {
    Router::new()
        .route("/api/version", get(version))
        .route("/api/info", get(info))
}
