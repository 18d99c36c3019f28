//! Pharma ML Core - Treatment Effectiveness Prediction Pipeline
//!
//! Feature standardization, logistic classification and artifact
//! persistence for the treatment effectiveness model.
//!
//! ```text
//! raw table ──► FeatureTransformer::fit ──► transform ──► BinaryClassifier::train
//!                                                               │
//!                        ModelArtifact::save ◄──────────────────┘
//!
//! serving: ModelArtifact::load ──► transform_single ──► predict_single
//! ```

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{PipelineError, Result};
pub use logic::artifact::ModelArtifact;
pub use logic::config::TrainingConfig;
pub use logic::dataset::{load_jsonl_table, stratified_split, SyntheticDataGenerator};
pub use logic::features::{
    feature_description, FeatureSchema, FeatureTable, FeatureTransformer, ScalerState,
};
pub use logic::model::{
    BinaryClassifier, ConfidenceTier, ModelInfo, PredictionResult, SolverParams,
    TrainingMetrics,
};
pub use logic::pipeline::{PredictionPipeline, ScoredPrediction};
