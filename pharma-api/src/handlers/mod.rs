//! HTTP handlers

pub mod health;
pub mod metrics;
pub mod model;
pub mod predict;
pub mod predictions;

use axum::http::Uri;

use crate::AppError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Endpoint not found: {}", uri.path()))
}
