//! Feature Schema - Ordered feature naming contract
//!
//! ## Rules:
//! 1. The schema is frozen from the training table's column order at fit time
//! 2. Every transform/predict input must match it in count AND order
//! 3. The layout hash travels with saved artifacts to detect drift on load

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

// ============================================================================
// FEATURE DESCRIPTIONS
// ============================================================================

/// Units and meaning of the clinical measurements this model is trained on.
/// Purely descriptive; the schema itself always comes from training data.
pub const FEATURE_DESCRIPTIONS: &[(&str, &str)] = &[
    ("drug_concentration", "Concentration of the drug in mg/mL"),
    ("patient_age", "Patient age in years"),
    ("patient_weight", "Patient weight in kg"),
    ("dosage_mg", "Drug dosage in milligrams"),
    ("treatment_duration_days", "Treatment duration in days"),
    ("biomarker_level", "Relevant biomarker level"),
    ("liver_function_score", "Liver function score (0-1)"),
    ("kidney_function_score", "Kidney function score (0-1)"),
];

pub fn feature_description(name: &str) -> Option<&'static str> {
    FEATURE_DESCRIPTIONS
        .iter()
        .find(|(feature, _)| *feature == name)
        .map(|(_, description)| *description)
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Ordered list of feature names defining vector shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty and duplicate names
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(PipelineError::InvalidData(
                "feature schema needs at least one column".to_string(),
            ));
        }

        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(PipelineError::InvalidData(format!(
                    "feature {} has an empty name",
                    i
                )));
            }
            if names[..i].contains(name) {
                return Err(PipelineError::InvalidData(format!(
                    "duplicate feature name '{}'",
                    name
                )));
            }
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// CRC32 over the ordered names, used to detect layout drift
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }
        hasher.finalize()
    }

    /// Check a raw vector width against the schema
    pub fn validate_width(&self, width: usize) -> Result<()> {
        if width != self.len() {
            return Err(PipelineError::schema_mismatch(
                format!("{} features", self.len()),
                format!("{} features", width),
            ));
        }
        Ok(())
    }

    /// Check that `columns` is exactly this schema, in order
    pub fn validate_columns(&self, columns: &[String]) -> Result<()> {
        if columns != self.names.as_slice() {
            return Err(PipelineError::schema_mismatch(
                format!("[{}]", self.names.join(", ")),
                format!("[{}]", columns.join(", ")),
            ));
        }
        Ok(())
    }

    pub fn info(&self) -> SchemaInfo {
        SchemaInfo {
            feature_count: self.len(),
            feature_names: self.names.clone(),
            layout_hash: self.layout_hash(),
        }
    }
}

/// Schema summary for logging and the feature endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub feature_count: usize,
    pub feature_names: Vec<String>,
    pub layout_hash: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(FeatureSchema::new(Vec::new()).is_err());
        assert!(FeatureSchema::new(names(&["a", "b", "a"])).is_err());
        assert!(FeatureSchema::new(names(&["a", " "])).is_err());
    }

    #[test]
    fn test_layout_hash_depends_on_order() {
        let ab = FeatureSchema::new(names(&["a", "b"])).unwrap();
        let ba = FeatureSchema::new(names(&["b", "a"])).unwrap();
        assert_eq!(ab.layout_hash(), ab.clone().layout_hash());
        assert_ne!(ab.layout_hash(), ba.layout_hash());
    }

    #[test]
    fn test_validate_columns_order() {
        let schema = FeatureSchema::new(names(&["a", "b"])).unwrap();
        assert!(schema.validate_columns(&names(&["a", "b"])).is_ok());
        assert!(matches!(
            schema.validate_columns(&names(&["b", "a"])),
            Err(PipelineError::SchemaMismatch { .. })
        ));
        assert!(schema.validate_width(3).is_err());
    }

    #[test]
    fn test_feature_descriptions() {
        assert_eq!(FEATURE_DESCRIPTIONS.len(), 8);
        assert_eq!(feature_description("patient_age"), Some("Patient age in years"));
        assert_eq!(feature_description("nonexistent"), None);
    }
}
