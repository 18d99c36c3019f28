//! Feature Table - named numeric columns backed by ndarray
//!
//! Missing values are encoded as `f64::NAN`.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{PipelineError, Result};

/// Row-major table of named numeric columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(PipelineError::InvalidData(format!(
                "{} column names for {} columns",
                columns.len(),
                values.ncols()
            )));
        }

        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(PipelineError::InvalidData(format!(
                    "duplicate column '{}'",
                    name
                )));
            }
        }

        Ok(Self { columns, values })
    }

    /// Build from row vectors; every row must have one value per column
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let width = columns.len();
        let mut flat = Vec::with_capacity(rows.len() * width);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PipelineError::InvalidData(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            flat.extend_from_slice(row);
        }

        let values = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| PipelineError::InvalidData(e.to_string()))?;
        Self::new(columns, values)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name).map(|i| self.values.column(i))
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.n_rows()).then(|| self.values.row(index))
    }

    /// Project onto `names` in the given order
    pub fn select(&self, names: &[String]) -> Result<FeatureTable> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let index = self.column_index(name).ok_or_else(|| {
                PipelineError::schema_mismatch(
                    format!("column '{}'", name),
                    format!("[{}]", self.columns.join(", ")),
                )
            })?;
            indices.push(index);
        }

        Ok(Self {
            columns: names.to_vec(),
            values: self.values.select(Axis(1), &indices),
        })
    }

    /// Separate the label column from the features.
    ///
    /// Labels must be present and exactly 0 or 1.
    pub fn split_target(&self, target: &str) -> Result<(FeatureTable, Vec<u8>)> {
        let target_idx = self.column_index(target).ok_or_else(|| {
            PipelineError::InvalidData(format!("target column '{}' not found", target))
        })?;

        let mut labels = Vec::with_capacity(self.n_rows());
        for (row, &value) in self.values.column(target_idx).iter().enumerate() {
            let label = if value == 0.0 {
                0
            } else if value == 1.0 {
                1
            } else {
                return Err(PipelineError::InvalidData(format!(
                    "row {}: label {} is not 0 or 1",
                    row, value
                )));
            };
            labels.push(label);
        }

        let feature_names: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.as_str() != target)
            .cloned()
            .collect();

        Ok((self.select(&feature_names)?, labels))
    }

    pub fn take_rows(&self, indices: &[usize]) -> Result<FeatureTable> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows()) {
            return Err(PipelineError::InvalidData(format!(
                "row index {} out of range for {} rows",
                bad,
                self.n_rows()
            )));
        }

        Ok(Self {
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), indices),
        })
    }

    pub(crate) fn with_values(&self, values: Array2<f64>) -> FeatureTable {
        debug_assert_eq!(values.ncols(), self.columns.len());
        Self {
            columns: self.columns.clone(),
            values,
        }
    }
}
