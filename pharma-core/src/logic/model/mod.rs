//! Model Module - Logistic classifier, solver and evaluation
//!
//! Training consumes already-standardized tables; see `features` for the
//! transformer that produces them.

pub mod classifier;
pub mod confidence;
pub mod metrics;
pub mod solver;

#[cfg(test)]
mod tests;

// Re-export common types
pub use classifier::{BinaryClassifier, ModelInfo, ModelParameters, PredictionResult, TrainedClassifier};
pub use confidence::{interpret, ConfidenceTier};
pub use metrics::{accuracy, roc_auc, ClassScores, ClassificationReport, TrainingMetrics};
pub use solver::{SolverParams, SOLVER_NAME};
