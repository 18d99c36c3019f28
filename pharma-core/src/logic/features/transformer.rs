//! Feature Transformer - median imputation + standardization
//!
//! `fit` freezes three things from the training table: the schema (column
//! order), the per-column imputation medians and the per-column mean/std.
//! All later transforms reuse those statistics, so serving never re-imputes
//! from request data.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::schema::FeatureSchema;
use super::table::FeatureTable;
use crate::error::{PipelineError, Result};
use crate::logic::numeric::median;

// ============================================================================
// SCALER STATE
// ============================================================================

/// Fit-time statistics for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub mean: f64,
    /// Population standard deviation; a zero-variance column is stored as 1.0
    pub std: f64,
    /// Imputation value. Older bundles lack it; the mean is used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
}

impl FeatureStats {
    /// Value substituted for a missing entry
    pub fn fill_value(&self) -> f64 {
        self.median.unwrap_or(self.mean)
    }

    #[inline]
    pub fn standardize(&self, value: f64) -> f64 {
        let value = if value.is_nan() { self.fill_value() } else { value };
        (value - self.mean) / self.std
    }
}

/// One `FeatureStats` per schema entry, in schema order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScalerState {
    pub stats: Vec<FeatureStats>,
}

impl ScalerState {
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn means(&self) -> Vec<f64> {
        self.stats.iter().map(|s| s.mean).collect()
    }

    pub fn stds(&self) -> Vec<f64> {
        self.stats.iter().map(|s| s.std).collect()
    }

    fn validate(&self, schema: &FeatureSchema) -> Result<()> {
        if self.len() != schema.len() {
            return Err(PipelineError::schema_mismatch(
                format!("{} scaler entries", schema.len()),
                format!("{} scaler entries", self.len()),
            ));
        }

        for (name, stats) in schema.names().iter().zip(&self.stats) {
            let finite = stats.mean.is_finite()
                && stats.std.is_finite()
                && stats.median.map_or(true, f64::is_finite);
            if !finite || stats.std <= 0.0 {
                return Err(PipelineError::CorruptArtifact(format!(
                    "invalid scaler statistics for '{}'",
                    name
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// TRANSFORMER
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct FittedScaler {
    schema: FeatureSchema,
    state: ScalerState,
}

/// Standardizes feature tables against statistics frozen at fit time.
///
/// `Unfit -> Fit` happens exactly once per instance; refitting requires a
/// fresh transformer so a serving scaler can never drift from its classifier.
#[derive(Debug, Clone, Default)]
pub struct FeatureTransformer {
    fitted: Option<FittedScaler>,
}

impl FeatureTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a fitted transformer from persisted state
    pub fn from_state(schema: FeatureSchema, state: ScalerState) -> Result<Self> {
        state.validate(&schema)?;
        Ok(Self {
            fitted: Some(FittedScaler { schema, state }),
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.fitted.as_ref().map(|f| &f.schema)
    }

    pub fn state(&self) -> Option<&ScalerState> {
        self.fitted.as_ref().map(|f| &f.state)
    }

    /// Compute medians, means and standard deviations for every column of
    /// `table` and freeze its column order as the schema.
    pub fn fit(&mut self, table: &FeatureTable) -> Result<&FeatureSchema> {
        if self.fitted.is_some() {
            return Err(PipelineError::AlreadyFitted("feature transformer"));
        }
        if table.is_empty() {
            return Err(PipelineError::InvalidData(
                "cannot fit scaler on an empty table".to_string(),
            ));
        }

        let schema = FeatureSchema::new(table.columns().to_vec())?;
        let values = table.values();
        let mut stats = Vec::with_capacity(schema.len());

        for (name, column) in schema.names().iter().zip(values.columns()) {
            let fill = median(column.iter().copied()).ok_or_else(|| {
                PipelineError::InvalidData(format!("column '{}' has no observed values", name))
            })?;

            let imputed: Vec<f64> = column
                .iter()
                .map(|&v| if v.is_nan() { fill } else { v })
                .collect();
            let n = imputed.len() as f64;
            let mean = imputed.iter().sum::<f64>() / n;
            let variance = imputed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let mut std = variance.sqrt();

            if std <= 0.0 || !std.is_finite() {
                log::warn!(
                    "Column '{}' has zero variance; standardizing with std = 1",
                    name
                );
                std = 1.0;
            }

            stats.push(FeatureStats {
                mean,
                std,
                median: Some(fill),
            });
        }

        log::info!(
            "Fitted scaler on {} rows x {} features",
            table.n_rows(),
            schema.len()
        );

        let fitted = self.fitted.insert(FittedScaler {
            schema,
            state: ScalerState { stats },
        });
        Ok(&fitted.schema)
    }

    pub fn fit_transform(&mut self, table: &FeatureTable) -> Result<FeatureTable> {
        self.fit(table)?;
        self.transform(table)
    }

    /// Standardize the schema columns of `table` (extra columns are dropped).
    pub fn transform(&self, table: &FeatureTable) -> Result<FeatureTable> {
        let fitted = self.require_fitted()?;
        let projected = table.select(fitted.schema.names())?;

        let source = projected.values();
        let mut out = Array2::<f64>::zeros(source.raw_dim());
        for (mut out_col, (col, stats)) in out
            .columns_mut()
            .into_iter()
            .zip(source.columns().into_iter().zip(&fitted.state.stats))
        {
            for (dst, &src) in out_col.iter_mut().zip(col.iter()) {
                *dst = stats.standardize(src);
            }
        }

        Ok(projected.with_values(out))
    }

    /// Standardize one raw vector given in schema order
    pub fn transform_single(&self, values: &[f64]) -> Result<Vec<f64>> {
        let fitted = self.require_fitted()?;
        fitted.schema.validate_width(values.len())?;

        Ok(values
            .iter()
            .zip(&fitted.state.stats)
            .map(|(&v, stats)| stats.standardize(v))
            .collect())
    }

    fn require_fitted(&self) -> Result<&FittedScaler> {
        self.fitted.as_ref().ok_or_else(|| {
            PipelineError::schema_mismatch("fitted feature schema", "unfitted transformer")
        })
    }
}
