//! Features Module - Schema, Tables and Standardization
//!
//! The schema is derived from the training table at fit time and travels
//! with the model; every transform/predict call is checked against it.

pub mod schema;
pub mod table;
pub mod transformer;

#[cfg(test)]
mod tests;

// Re-export common types
pub use schema::{FeatureSchema, SchemaInfo, feature_description, FEATURE_DESCRIPTIONS};
pub use table::FeatureTable;
pub use transformer::{FeatureStats, FeatureTransformer, ScalerState};
