//! L2-regularized logistic regression fit through linfa-logistic
//!
//! Minimizes
//!
//! ```text
//! f(w, b) = 0.5 * ||w||^2 + C * sum_i [ log(1 + exp(z_i)) - y_i * z_i ],   z = Xw + b
//! ```
//!
//! linfa scales the same objective by `1 / C`, so `alpha = 1 / C`. The
//! intercept is not penalized.

use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_C, DEFAULT_MAX_ITER, DEFAULT_TOL};
use crate::error::{PipelineError, Result};

/// Name reported in model introspection
pub const SOLVER_NAME: &str = "lbfgs";

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Inverse regularization strength (larger = weaker penalty)
    #[serde(rename = "C")]
    pub c: f64,
    /// L-BFGS iteration budget
    pub max_iter: usize,
    /// Gradient-norm stopping tolerance
    pub tol: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            c: DEFAULT_C,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
        }
    }
}

impl SolverParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(PipelineError::InvalidData(format!(
                "C must be positive, got {}",
                self.c
            )));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(PipelineError::InvalidData(format!(
                "tol must be positive, got {}",
                self.tol
            )));
        }
        if self.max_iter == 0 {
            return Err(PipelineError::InvalidData(
                "max_iter must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn estimator(&self) -> LogisticRegression<f64> {
        LogisticRegression::default()
            .alpha(1.0 / self.c)
            .with_intercept(true)
            .max_iterations(self.max_iter as u64)
            .gradient_tolerance(self.tol)
    }
}

/// Fitted coefficients
#[derive(Debug, Clone)]
pub struct SolverOutput {
    pub weights: Vec<f64>,
    pub bias: f64,
}

// ============================================================================
// SOLVER
// ============================================================================

/// Fit weights and bias on standardized features `x` (n_samples x n_features)
/// and labels `y` in {0, 1}.
pub fn fit_logistic(x: ArrayView2<'_, f64>, y: &[u8], params: &SolverParams) -> Result<SolverOutput> {
    params.validate()?;

    if x.nrows() != y.len() {
        return Err(PipelineError::InvalidData(format!(
            "{} rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }

    let targets: Array1<bool> = y.iter().map(|&label| label == 1).collect();
    let dataset = Dataset::new(x.to_owned(), targets);

    let model = params
        .estimator()
        .fit(&dataset)
        .map_err(|e| PipelineError::TrainingFailure(format!("logistic regression fit failed: {}", e)))?;

    // linfa picks its own positive class; orient the coefficients on label 1.
    // A row with z > 0 is predicted as linfa's positive class, z < 0 as its
    // negative class.
    let decision = dataset.records().dot(model.params()) + model.intercept();
    let predicted = model.predict(dataset.records());
    let sign = match decision
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    {
        Some((row, &z)) if z != 0.0 && (z > 0.0) != predicted[row] => -1.0,
        _ => 1.0,
    };
    let weights: Vec<f64> = model.params().iter().map(|w| sign * w).collect();
    let bias = sign * model.intercept();

    if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
        return Err(PipelineError::TrainingFailure(
            "solver produced non-finite coefficients".to_string(),
        ));
    }

    log::debug!("{} fit: bias = {:.6}, weights = {:?}", SOLVER_NAME, bias, weights);
    Ok(SolverOutput { weights, bias })
}
