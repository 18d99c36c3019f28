//! Binary Classifier - regularized logistic regression
//!
//! `Untrained -> Trained` is one-way per instance. Training on an already
//! trained instance is rejected; a retrain builds a new classifier and the
//! host swaps the whole pipeline.

use std::time::Instant;

use chrono::Utc;
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::confidence::{interpret, ConfidenceTier};
use super::metrics::{accuracy, roc_auc, ClassificationReport, TrainingMetrics};
use super::solver::{fit_logistic, SolverParams, SOLVER_NAME};
use crate::constants::{DEFAULT_MODEL_VERSION, MODEL_TYPE};
use crate::error::{PipelineError, Result};
use crate::logic::features::{FeatureSchema, FeatureTable};
use crate::logic::numeric::sigmoid;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Immutable state of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedClassifier {
    pub schema: FeatureSchema,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub params: SolverParams,
    pub metrics: Option<TrainingMetrics>,
}

impl TrainedClassifier {
    fn decision(&self, row: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }

    fn decision_batch(&self, x: ArrayView2<'_, f64>) -> Array1<f64> {
        x.dot(&Array1::from(self.weights.clone())) + self.bias
    }
}

#[derive(Debug, Clone)]
enum ClassifierState {
    Untrained,
    Trained(TrainedClassifier),
}

/// Single-sample prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_class: u8,
    pub probability_class_0: f64,
    pub probability_class_1: f64,
    pub max_probability: f64,
    pub confidence_tier: ConfidenceTier,
    pub interpretation: String,
}

/// Hyperparameters as reported by `get_model_info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParameters {
    #[serde(rename = "C")]
    pub c: f64,
    pub solver: String,
    pub max_iter: usize,
    pub tol: f64,
}

/// Read-only description of the classifier for the model-info endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub is_trained: bool,
    pub model_version: String,
    pub model_type: String,
    pub feature_count: usize,
    pub feature_names: Option<Vec<String>>,
    pub training_metrics: Option<TrainingMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_parameters: Option<ModelParameters>,
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct BinaryClassifier {
    params: SolverParams,
    model_version: String,
    state: ClassifierState,
}

impl Default for BinaryClassifier {
    fn default() -> Self {
        Self::new(SolverParams::default())
    }
}

impl BinaryClassifier {
    pub fn new(params: SolverParams) -> Self {
        Self {
            params,
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            state: ClassifierState::Untrained,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    /// Rebuild a trained classifier from persisted state
    pub fn from_trained(trained: TrainedClassifier, model_version: impl Into<String>) -> Result<Self> {
        if trained.weights.len() != trained.schema.len() {
            return Err(PipelineError::CorruptArtifact(format!(
                "{} weights for {} features",
                trained.weights.len(),
                trained.schema.len()
            )));
        }
        if !trained.bias.is_finite() || trained.weights.iter().any(|w| !w.is_finite()) {
            return Err(PipelineError::CorruptArtifact(
                "non-finite classifier coefficients".to_string(),
            ));
        }

        Ok(Self {
            params: trained.params.clone(),
            model_version: model_version.into(),
            state: ClassifierState::Trained(trained),
        })
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, ClassifierState::Trained(_))
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn trained(&self) -> Result<&TrainedClassifier> {
        match &self.state {
            ClassifierState::Trained(trained) => Ok(trained),
            ClassifierState::Untrained => Err(PipelineError::NotTrained),
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.trained().ok().map(|t| t.schema.names())
    }

    pub fn training_metrics(&self) -> Option<&TrainingMetrics> {
        self.trained().ok().and_then(|t| t.metrics.as_ref())
    }

    /// Fit on standardized features. The feature order of `x_train` becomes
    /// the classifier's schema. When `test` is given, held-out metrics and a
    /// classification report are included.
    pub fn train(
        &mut self,
        x_train: &FeatureTable,
        y_train: &[u8],
        test: Option<(&FeatureTable, &[u8])>,
    ) -> Result<TrainingMetrics> {
        if self.is_trained() {
            return Err(PipelineError::AlreadyFitted("classifier"));
        }

        log::info!("Starting model training...");
        let started = Instant::now();

        validate_training_set(x_train, y_train)?;
        let schema = FeatureSchema::new(x_train.columns().to_vec())?;

        let output = fit_logistic(x_train.values(), y_train, &self.params)?;
        let mut trained = TrainedClassifier {
            schema,
            weights: output.weights,
            bias: output.bias,
            params: self.params.clone(),
            metrics: None,
        };

        let train_scores = trained.decision_batch(x_train.values()).mapv(sigmoid);
        let train_pred = hard_labels(&train_scores);
        let train_scores = train_scores.to_vec();

        let mut metrics = TrainingMetrics {
            train_accuracy: accuracy(y_train, &train_pred),
            train_auc: roc_auc(y_train, &train_scores).unwrap_or(0.5),
            training_date: Utc::now(),
            n_samples: x_train.n_rows(),
            n_features: trained.schema.len(),
            feature_names: trained.schema.names().to_vec(),
            test_accuracy: None,
            test_auc: None,
            test_samples: None,
            test_classification_report: None,
        };

        if let Some((x_test, y_test)) = test {
            trained.schema.validate_columns(x_test.columns())?;
            if x_test.n_rows() != y_test.len() {
                return Err(PipelineError::InvalidData(format!(
                    "test set has {} rows but {} labels",
                    x_test.n_rows(),
                    y_test.len()
                )));
            }

            let test_scores = trained.decision_batch(x_test.values()).mapv(sigmoid);
            let test_pred = hard_labels(&test_scores);

            metrics.test_accuracy = Some(accuracy(y_test, &test_pred));
            metrics.test_auc = roc_auc(y_test, &test_scores.to_vec());
            metrics.test_samples = Some(x_test.n_rows());
            metrics.test_classification_report =
                Some(ClassificationReport::compute(y_test, &test_pred));

            log::info!(
                "Test Accuracy: {:.4}",
                metrics.test_accuracy.unwrap_or_default()
            );
            if let Some(auc) = metrics.test_auc {
                log::info!("Test AUC: {:.4}", auc);
            }
        }

        log::info!("Model training completed in {:?}", started.elapsed());
        log::info!("Training Accuracy: {:.4}", metrics.train_accuracy);
        log::info!("Training AUC: {:.4}", metrics.train_auc);

        trained.metrics = Some(metrics.clone());
        self.state = ClassifierState::Trained(trained);
        Ok(metrics)
    }

    /// Batch hard labels
    pub fn predict(&self, x: &FeatureTable) -> Result<Vec<u8>> {
        let proba = self.positive_proba(x)?;
        log::debug!("Made predictions for {} samples", x.n_rows());
        Ok(hard_labels(&proba))
    }

    /// Batch class probabilities, one `[p0, p1]` row per sample
    pub fn predict_proba(&self, x: &FeatureTable) -> Result<Array2<f64>> {
        let proba = self.positive_proba(x)?;
        let mut out = Array2::<f64>::zeros((proba.len(), 2));
        for (mut row, &p1) in out.rows_mut().into_iter().zip(proba.iter()) {
            row[0] = 1.0 - p1;
            row[1] = p1;
        }
        log::debug!("Generated probabilities for {} samples", x.n_rows());
        Ok(out)
    }

    /// Predict one standardized vector given in schema order
    pub fn predict_single(&self, features: &[f64]) -> Result<PredictionResult> {
        let trained = self.trained()?;
        trained.schema.validate_width(features.len())?;
        if features.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::InvalidData(
                "feature values must be finite".to_string(),
            ));
        }

        let probability_class_1 = sigmoid(trained.decision(features));
        let probability_class_0 = 1.0 - probability_class_1;
        let predicted_class = u8::from(probability_class_1 > 0.5);
        let max_probability = probability_class_0.max(probability_class_1);

        let result = PredictionResult {
            predicted_class,
            probability_class_0,
            probability_class_1,
            max_probability,
            confidence_tier: ConfidenceTier::from_probability(max_probability),
            interpretation: interpret(predicted_class, max_probability).to_string(),
        };

        log::debug!(
            "Single prediction: class={} p={:.4} confidence={}",
            result.predicted_class,
            result.max_probability,
            result.confidence_tier
        );
        Ok(result)
    }

    /// Feature -> |coefficient|, most important first
    pub fn feature_importance(&self) -> Result<Vec<(String, f64)>> {
        let trained = self.trained()?;
        if trained.schema.is_empty() {
            return Err(PipelineError::InvalidData(
                "feature names not available".to_string(),
            ));
        }

        let mut importance: Vec<(String, f64)> = trained
            .schema
            .names()
            .iter()
            .cloned()
            .zip(trained.weights.iter().map(|w| w.abs()))
            .collect();
        importance.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(importance)
    }

    pub fn get_model_info(&self) -> ModelInfo {
        let trained = self.trained().ok();

        ModelInfo {
            is_trained: trained.is_some(),
            model_version: self.model_version.clone(),
            model_type: MODEL_TYPE.to_string(),
            feature_count: trained.map_or(0, |t| t.schema.len()),
            feature_names: trained.map(|t| t.schema.names().to_vec()),
            training_metrics: trained.and_then(|t| t.metrics.clone()),
            model_parameters: trained.map(|t| ModelParameters {
                c: t.params.c,
                solver: SOLVER_NAME.to_string(),
                max_iter: t.params.max_iter,
                tol: t.params.tol,
            }),
        }
    }

    fn positive_proba(&self, x: &FeatureTable) -> Result<Array1<f64>> {
        let trained = self.trained()?;
        trained.schema.validate_columns(x.columns())?;
        if let Some(row) = x.values().rows().into_iter().position(|r| r.iter().any(|v| !v.is_finite())) {
            return Err(PipelineError::InvalidData(format!(
                "feature values must be finite (row {})",
                row
            )));
        }
        Ok(trained.decision_batch(x.values()).mapv(sigmoid))
    }
}

fn hard_labels(proba: &Array1<f64>) -> Vec<u8> {
    proba.iter().map(|&p| u8::from(p > 0.5)).collect()
}

fn validate_training_set(x: &FeatureTable, y: &[u8]) -> Result<()> {
    if x.is_empty() {
        return Err(PipelineError::TrainingFailure(
            "training set is empty".to_string(),
        ));
    }
    if x.n_rows() != y.len() {
        return Err(PipelineError::InvalidData(format!(
            "{} training rows but {} labels",
            x.n_rows(),
            y.len()
        )));
    }
    if let Some(bad) = y.iter().find(|&&label| label > 1) {
        return Err(PipelineError::InvalidData(format!(
            "label {} is not 0 or 1",
            bad
        )));
    }
    if x.values().iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::InvalidData(
            "training features must be finite; transform before training".to_string(),
        ));
    }

    let positives = y.iter().filter(|&&label| label == 1).count();
    if positives == 0 || positives == y.len() {
        return Err(PipelineError::TrainingFailure(format!(
            "training labels contain a single class ({} of {} positive)",
            positives,
            y.len()
        )));
    }
    Ok(())
}
