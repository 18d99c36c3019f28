//! JSONL training tables
//!
//! One JSON object per line. Column order comes from the first record;
//! `null` or absent values are treated as missing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{PipelineError, Result};
use crate::logic::features::FeatureTable;

pub fn load_jsonl_table(path: &Path) -> Result<FeatureTable> {
    if !path.exists() {
        return Err(PipelineError::NotFound(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut columns: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: Map<String, Value> = serde_json::from_str(&line).map_err(|e| {
            PipelineError::InvalidData(format!("line {}: {}", line_no + 1, e))
        })?;

        let columns = columns.get_or_insert_with(|| record.keys().cloned().collect());
        if let Some(extra) = record.keys().find(|k| !columns.contains(*k)) {
            return Err(PipelineError::InvalidData(format!(
                "line {}: unexpected column '{}'",
                line_no + 1,
                extra
            )));
        }

        let mut row = Vec::with_capacity(columns.len());
        for column in columns.iter() {
            let value = match record.get(column) {
                None | Some(Value::Null) => f64::NAN,
                Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
                Some(other) => {
                    return Err(PipelineError::InvalidData(format!(
                        "line {}: column '{}' is not numeric ({})",
                        line_no + 1,
                        column,
                        other
                    )))
                }
            };
            row.push(value);
        }
        rows.push(row);
    }

    let columns = columns.ok_or_else(|| {
        PipelineError::InvalidData(format!("{} contains no records", path.display()))
    })?;

    log::info!(
        "Successfully loaded data with shape: ({}, {}) from {}",
        rows.len(),
        columns.len(),
        path.display()
    );
    FeatureTable::from_rows(columns, &rows)
}
