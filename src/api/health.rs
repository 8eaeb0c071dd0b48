use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::config::AppEnv;
use crate::mail::TransportKind;
use crate::state::AppState;

/// Health response structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since startup
    pub uptime: f64,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub email_ready: bool,
}

#[derive(Debug, Serialize)]
pub struct TransportInfo {
    pub id: String,
    pub kind: TransportKind,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub environment: &'static str,
    pub endpoints: Vec<&'static str>,
    pub transports: Vec<TransportInfo>,
}

/// Health routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
}

/// GET / - Service summary
async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let environment = match state.config.app_env {
        AppEnv::Development => "development",
        AppEnv::Production => "production",
    };

    Json(ServiceInfo {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        environment,
        endpoints: vec!["GET /", "GET /health", "POST /contact"],
        transports: state
            .mailer
            .transports()
            .map(|t| TransportInfo {
                id: t.id().to_string(),
                kind: t.kind(),
            })
            .collect(),
    })
}

/// GET /health - Liveness probe, always 200
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now().timestamp_millis(),
        email_ready: state.mailer.is_configured(),
    })
}
