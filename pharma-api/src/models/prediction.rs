//! Prediction API models

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use pharma_core::ConfidenceTier;

use crate::store::PredictionRecord;

#[derive(Debug, Deserialize, Validate)]
pub struct PredictionRequest {
    /// Raw feature values in model schema order; `null` marks a missing value
    #[validate(length(min = 1, max = 256, message = "features must contain between 1 and 256 values"))]
    pub features: Vec<Option<f64>>,
}

impl PredictionRequest {
    /// Missing values become NaN so the transformer imputes them
    pub fn raw_values(&self) -> Vec<f64> {
        self.features
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    /// Probability of the predicted class
    pub probability: f64,
    pub probability_class_0: f64,
    pub probability_class_1: f64,
    pub confidence: ConfidenceTier,
    pub interpretation: String,
    pub feature_names: Vec<String>,
    pub model_version: String,
    /// Absent when the prediction could not be stored
    pub prediction_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecentPredictionsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecentPredictionsResponse {
    pub predictions: Vec<PredictionRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct FeatureDescription {
    pub name: String,
    pub description: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct FeatureInfoResponse {
    pub feature_names: Vec<String>,
    pub feature_count: usize,
    pub feature_descriptions: Vec<FeatureDescription>,
    pub layout_hash: u32,
}

#[derive(Debug, Serialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Serialize)]
pub struct FeatureImportanceResponse {
    pub model_version: String,
    pub feature_importance: Vec<FeatureWeight>,
}
