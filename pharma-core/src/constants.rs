//! Pipeline constants

/// Version stamped on freshly trained models and assumed for bundles without one
pub const DEFAULT_MODEL_VERSION: &str = "1.0.0";

/// Human readable model family reported by `get_model_info`
pub const MODEL_TYPE: &str = "Logistic Regression";

/// Label column in training tables
pub const TARGET_COLUMN: &str = "treatment_effective";

/// Artifact envelope format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Default artifact location
pub const DEFAULT_MODEL_PATH: &str = "models/pharma_model.json";

// ============================================================================
// CONFIDENCE TIERS
// ============================================================================

/// max(p0, p1) strictly above this is a high confidence prediction
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// max(p0, p1) strictly above this is a medium confidence prediction
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 0.6;

// ============================================================================
// TRAINING DEFAULTS
// ============================================================================

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SYNTHETIC_SAMPLES: usize = 2000;
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Inverse L2 regularization strength
pub const DEFAULT_C: f64 = 1.0;
pub const DEFAULT_MAX_ITER: usize = 1000;
pub const DEFAULT_TOL: f64 = 1e-4;
