//! Metrics handlers

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::monitoring::MetricsSnapshot;
use crate::{AppError, AppResult, AppState};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// System and application metrics
pub async fn get(State(state): State<AppState>) -> AppResult<Json<MetricsSnapshot>> {
    let metrics = state.metrics.clone();
    let snapshot = tokio::task::spawn_blocking(move || metrics.snapshot()).await?;
    Ok(Json(snapshot))
}

/// Prometheus text exposition of the same collectors
pub async fn prometheus(State(state): State<AppState>) -> AppResult<Response> {
    let metrics = state.metrics.clone();
    let text = tokio::task::spawn_blocking(move || {
        // Refresh the system gauges before rendering
        metrics.system_metrics();
        metrics.gather_text()
    })
    .await?
    .map_err(|e| AppError::InternalError(format!("failed to gather metrics: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], text).into_response())
}
