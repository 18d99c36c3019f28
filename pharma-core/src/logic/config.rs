//! Configuration module - training run settings

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MODEL_PATH, DEFAULT_MODEL_VERSION, DEFAULT_SEED, DEFAULT_SYNTHETIC_SAMPLES,
    DEFAULT_TEST_SIZE, TARGET_COLUMN,
};
use crate::logic::model::SolverParams;

/// Everything a training run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Rows to synthesize when no training data file is configured
    pub n_samples: usize,

    /// Seed for data generation and the train/test split
    pub seed: u64,

    /// Held-out fraction, in (0, 1)
    pub test_size: f64,

    pub target_column: String,

    pub model_version: String,

    /// Where the artifact is read from and written to
    pub model_path: PathBuf,

    /// JSONL export to train from instead of synthetic data
    pub training_data: Option<PathBuf>,

    pub solver: SolverParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_samples: DEFAULT_SYNTHETIC_SAMPLES,
            seed: DEFAULT_SEED,
            test_size: DEFAULT_TEST_SIZE,
            target_column: TARGET_COLUMN.to_string(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            training_data: None,
            solver: SolverParams::default(),
        }
    }
}

impl TrainingConfig {
    /// Load configuration from `PHARMA_*` environment variables, falling
    /// back to defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            n_samples: parsed(&lookup, "PHARMA_SAMPLES").unwrap_or(defaults.n_samples),
            seed: parsed(&lookup, "PHARMA_SEED").unwrap_or(defaults.seed),
            test_size: parsed(&lookup, "PHARMA_TEST_SIZE").unwrap_or(defaults.test_size),
            target_column: lookup("PHARMA_TARGET_COLUMN").unwrap_or(defaults.target_column),
            model_version: lookup("PHARMA_MODEL_VERSION").unwrap_or(defaults.model_version),
            model_path: lookup("PHARMA_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            training_data: lookup("PHARMA_TRAINING_DATA")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            solver: SolverParams {
                c: parsed(&lookup, "PHARMA_C").unwrap_or(defaults.solver.c),
                max_iter: parsed(&lookup, "PHARMA_MAX_ITER").unwrap_or(defaults.solver.max_iter),
                tol: parsed(&lookup, "PHARMA_TOL").unwrap_or(defaults.solver.tol),
            },
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
