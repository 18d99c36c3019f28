//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    version: &'static str,
    health: &'static str,
    metrics: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_loaded: bool,
    model_version: String,
    store_status: bool,
    environment: String,
}

/// Service information
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Pharma ML API",
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
        metrics: "/metrics",
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_loaded: state.pipeline.classifier().is_trained(),
        model_version: state.pipeline.model_version().to_string(),
        store_status: state.store.health_check(),
        environment: state.config.environment.clone(),
    })
}
