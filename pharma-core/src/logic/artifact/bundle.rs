//! Versioned model bundle

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::storage::{load_artifact, save_artifact};
use crate::constants::DEFAULT_MODEL_VERSION;
use crate::error::{PipelineError, Result};
use crate::logic::features::{FeatureSchema, FeatureTransformer, ScalerState};
use crate::logic::model::{BinaryClassifier, SolverParams, TrainedClassifier, TrainingMetrics};

fn default_model_version() -> String {
    DEFAULT_MODEL_VERSION.to_string()
}

/// Inference-relevant state of one trained pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_model_version")]
    pub model_version: String,

    pub feature_schema: FeatureSchema,

    /// Per-feature (mean, std, median), in schema order
    pub scaler_state: ScalerState,

    pub classifier_weights: Vec<f64>,

    pub classifier_bias: f64,

    #[serde(default)]
    pub solver_params: SolverParams,

    #[serde(default)]
    pub training_metrics: Option<TrainingMetrics>,

    /// CRC32 of the schema layout at save time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_hash: Option<u32>,
}

impl ModelArtifact {
    /// Capture a trained classifier and the transformer it was trained behind
    pub fn from_parts(classifier: &BinaryClassifier, transformer: &FeatureTransformer) -> Result<Self> {
        let trained = classifier.trained().map_err(|_| {
            PipelineError::TrainingFailure("cannot save an untrained model".to_string())
        })?;

        let (schema, scaler_state) = match (transformer.schema(), transformer.state()) {
            (Some(schema), Some(state)) => (schema, state),
            _ => {
                return Err(PipelineError::TrainingFailure(
                    "cannot save a model without a fitted feature transformer".to_string(),
                ))
            }
        };
        schema.validate_columns(trained.schema.names())?;

        Ok(Self {
            model_version: classifier.model_version().to_string(),
            feature_schema: schema.clone(),
            scaler_state: scaler_state.clone(),
            classifier_weights: trained.weights.clone(),
            classifier_bias: trained.bias,
            solver_params: trained.params.clone(),
            training_metrics: trained.metrics.clone(),
            schema_hash: Some(schema.layout_hash()),
        })
    }

    /// Rebuild the fitted transformer and trained classifier
    pub fn into_parts(self) -> Result<(FeatureTransformer, BinaryClassifier)> {
        // Deserialization does not run the schema constructor's checks
        let schema = FeatureSchema::new(self.feature_schema.names().to_vec())
            .map_err(|e| PipelineError::CorruptArtifact(e.to_string()))?;

        if let Some(stored) = self.schema_hash {
            let actual = schema.layout_hash();
            if stored != actual {
                return Err(PipelineError::CorruptArtifact(format!(
                    "schema hash {:08x} does not match feature layout {:08x}",
                    stored, actual
                )));
            }
        }

        let transformer = FeatureTransformer::from_state(schema.clone(), self.scaler_state)
            .map_err(|e| PipelineError::CorruptArtifact(e.to_string()))?;
        let classifier = BinaryClassifier::from_trained(
            TrainedClassifier {
                schema,
                weights: self.classifier_weights,
                bias: self.classifier_bias,
                params: self.solver_params,
                metrics: self.training_metrics,
            },
            self.model_version,
        )?;

        Ok((transformer, classifier))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_artifact(self, path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_artifact(path)
    }
}
