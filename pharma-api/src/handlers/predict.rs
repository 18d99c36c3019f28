//! Prediction handler

use axum::{extract::State, Json};
use validator::Validate;

use crate::models::{PredictionRequest, PredictionResponse};
use crate::store::PredictionRecord;
use crate::{AppResult, AppState};

/// Score one feature vector
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictionRequest>,
) -> AppResult<Json<PredictionResponse>> {
    req.validate()?;

    let scored = state.pipeline.predict_single(&req.raw_values())?;
    let result = scored.result;
    state
        .metrics
        .record_prediction(result.predicted_class, scored.latency);

    let model_version = state.pipeline.model_version().to_string();
    let record = PredictionRecord::new(req.features, &result, &model_version);
    let prediction_id = match state.store.put(record) {
        Ok(id) => Some(id),
        Err(e) => {
            // Serving continues without persistence
            tracing::warn!("Failed to store prediction: {}", e);
            None
        }
    };

    tracing::info!(
        "Prediction completed in {:?}: class={} confidence={}",
        scored.latency,
        result.predicted_class,
        result.confidence_tier
    );

    Ok(Json(PredictionResponse {
        prediction: result.predicted_class,
        probability: result.max_probability,
        probability_class_0: result.probability_class_0,
        probability_class_1: result.probability_class_1,
        confidence: result.confidence_tier,
        interpretation: result.interpretation,
        feature_names: state.pipeline.feature_schema().names().to_vec(),
        model_version,
        prediction_id,
    }))
}
