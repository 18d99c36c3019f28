//! Dataset Module - Training data sources and splitting
//!
//! - `synthetic`: seeded generator for bootstrap/demo training
//! - `jsonl`: one JSON object per line, as written by data exports
//! - `split`: stratified train/test partition

pub mod jsonl;
pub mod split;
pub mod synthetic;

#[cfg(test)]
mod tests;

pub use jsonl::load_jsonl_table;
pub use split::{stratified_split, TrainTestSplit};
pub use synthetic::{SyntheticDataGenerator, PHARMA_FEATURES};
