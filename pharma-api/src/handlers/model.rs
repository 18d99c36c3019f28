//! Model introspection handlers

use axum::{extract::State, Json};
use pharma_core::{feature_description, ModelInfo};

use crate::models::{FeatureDescription, FeatureImportanceResponse, FeatureInfoResponse, FeatureWeight};
use crate::{AppResult, AppState};

pub async fn info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.pipeline.model_info())
}

pub async fn features(State(state): State<AppState>) -> Json<FeatureInfoResponse> {
    let schema = state.pipeline.feature_schema();
    let info = schema.info();

    Json(FeatureInfoResponse {
        feature_descriptions: info
            .feature_names
            .iter()
            .map(|name| FeatureDescription {
                name: name.clone(),
                description: feature_description(name),
            })
            .collect(),
        feature_count: info.feature_count,
        feature_names: info.feature_names,
        layout_hash: info.layout_hash,
    })
}

pub async fn importance(State(state): State<AppState>) -> AppResult<Json<FeatureImportanceResponse>> {
    let feature_importance = state
        .pipeline
        .feature_importance()?
        .into_iter()
        .map(|(feature, importance)| FeatureWeight { feature, importance })
        .collect();

    Ok(Json(FeatureImportanceResponse {
        model_version: state.pipeline.model_version().to_string(),
        feature_importance,
    }))
}
