//! Stored prediction handlers

use axum::{extract::{Query, State}, Json};

use crate::models::{RecentPredictionsQuery, RecentPredictionsResponse};
use crate::store::PredictionStats;
use crate::{AppResult, AppState};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

/// Newest predictions first
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentPredictionsQuery>,
) -> AppResult<Json<RecentPredictionsResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let predictions = state.store.query(&|_| true, limit)?;

    Ok(Json(RecentPredictionsResponse {
        count: predictions.len(),
        predictions,
    }))
}

pub async fn stats(State(state): State<AppState>) -> AppResult<Json<PredictionStats>> {
    Ok(Json(state.store.stats()?))
}
