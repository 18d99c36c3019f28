//! Prediction Pipeline - one fitted transformer paired with its classifier
//!
//! Immutable once built. A host shares it behind `Arc` and swaps the whole
//! pipeline to retrain.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{PipelineError, Result};
use crate::logic::artifact::ModelArtifact;
use crate::logic::config::TrainingConfig;
use crate::logic::dataset::{load_jsonl_table, stratified_split, SyntheticDataGenerator};
use crate::logic::features::{FeatureSchema, FeatureTable, FeatureTransformer};
use crate::logic::model::{BinaryClassifier, ModelInfo, PredictionResult, TrainingMetrics};

/// Prediction plus the time spent producing it, for the metrics sink
#[derive(Debug, Clone)]
pub struct ScoredPrediction {
    pub result: PredictionResult,
    pub latency: Duration,
}

#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    schema: FeatureSchema,
    transformer: FeatureTransformer,
    classifier: BinaryClassifier,
}

impl PredictionPipeline {
    /// Pair a fitted transformer with a classifier trained on its output
    pub fn from_parts(transformer: FeatureTransformer, classifier: BinaryClassifier) -> Result<Self> {
        let schema = transformer
            .schema()
            .cloned()
            .ok_or_else(|| PipelineError::schema_mismatch("fitted feature schema", "unfitted transformer"))?;
        schema.validate_columns(classifier.trained()?.schema.names())?;

        Ok(Self {
            schema,
            transformer,
            classifier,
        })
    }

    /// Fit the scaler on every feature column of `table`, split, and train.
    pub fn train(table: &FeatureTable, config: &TrainingConfig) -> Result<(Self, TrainingMetrics)> {
        log::info!(
            "Training pipeline on {} rows (target '{}', test_size {}, seed {})",
            table.n_rows(),
            config.target_column,
            config.test_size,
            config.seed
        );

        let (features, labels) = table.split_target(&config.target_column)?;

        let mut transformer = FeatureTransformer::new();
        let scaled = transformer.fit_transform(&features)?;
        let split = stratified_split(&scaled, &labels, config.test_size, config.seed)?;

        let mut classifier =
            BinaryClassifier::new(config.solver.clone()).with_version(config.model_version.as_str());
        let metrics = classifier.train(
            &split.x_train,
            &split.y_train,
            Some((&split.x_test, &split.y_test)),
        )?;

        Ok((Self::from_parts(transformer, classifier)?, metrics))
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let (transformer, classifier) = artifact.into_parts()?;
        Self::from_parts(transformer, classifier)
    }

    pub fn to_artifact(&self) -> Result<ModelArtifact> {
        ModelArtifact::from_parts(&self.classifier, &self.transformer)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_artifact(ModelArtifact::load(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.to_artifact()?.save(path)
    }

    /// Load the configured artifact, or train and save a fresh model when
    /// none exists. Any other load failure is returned as-is.
    pub fn load_or_train(config: &TrainingConfig) -> Result<Self> {
        match Self::load(&config.model_path) {
            Ok(pipeline) => return Ok(pipeline),
            Err(PipelineError::NotFound(path)) => {
                log::info!("No saved model at {}, training a new one", path.display());
            }
            Err(e) => return Err(e),
        }

        let table = match &config.training_data {
            Some(path) => {
                log::info!("Loading training data from {}", path.display());
                load_jsonl_table(path)?
            }
            None => SyntheticDataGenerator::new(config.seed).generate(config.n_samples)?,
        };

        let (pipeline, _) = Self::train(&table, config)?;
        pipeline.save(&config.model_path)?;
        Ok(pipeline)
    }

    /// Standardize and classify one raw vector given in schema order.
    /// Missing values (NaN) are imputed with the fit-time medians.
    pub fn predict_single(&self, raw: &[f64]) -> Result<ScoredPrediction> {
        let started = Instant::now();
        let scaled = self.transformer.transform_single(raw)?;
        let result = self.classifier.predict_single(&scaled)?;
        let latency = started.elapsed();

        log::debug!(
            "Prediction: class={} p={:.4} latency={:?}",
            result.predicted_class,
            result.max_probability,
            latency
        );
        Ok(ScoredPrediction { result, latency })
    }

    pub fn feature_schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model_version(&self) -> &str {
        self.classifier.model_version()
    }

    pub fn model_info(&self) -> ModelInfo {
        self.classifier.get_model_info()
    }

    pub fn feature_importance(&self) -> Result<Vec<(String, f64)>> {
        self.classifier.feature_importance()
    }

    pub fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    pub fn classifier(&self) -> &BinaryClassifier {
        &self.classifier
    }
}
