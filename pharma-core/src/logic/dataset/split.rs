//! Stratified train/test split

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::{PipelineError, Result};
use crate::logic::features::FeatureTable;

#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: FeatureTable,
    pub x_test: FeatureTable,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
}

/// Partition rows so each class keeps its proportion in both halves.
///
/// Each class contributes `round(test_size * class_count)` rows to the test
/// set; both partitions are shuffled with the same seeded RNG.
pub fn stratified_split(
    x: &FeatureTable,
    y: &[u8],
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::InvalidData(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    if x.n_rows() != y.len() {
        return Err(PipelineError::InvalidData(format!(
            "{} rows but {} labels",
            x.n_rows(),
            y.len()
        )));
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut train_idx = Vec::with_capacity(y.len());
    let mut test_idx = Vec::new();

    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        members.shuffle(&mut rng);

        let n_test = (test_size * members.len() as f64).round() as usize;
        test_idx.extend_from_slice(&members[..n_test]);
        train_idx.extend_from_slice(&members[n_test..]);
    }

    if train_idx.is_empty() || test_idx.is_empty() {
        return Err(PipelineError::InvalidData(format!(
            "split of {} rows with test_size {} leaves an empty partition",
            y.len(),
            test_size
        )));
    }

    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    log::info!(
        "Split data into train: {} rows, test: {} rows",
        train_idx.len(),
        test_idx.len()
    );

    Ok(TrainTestSplit {
        x_train: x.take_rows(&train_idx)?,
        x_test: x.take_rows(&test_idx)?,
        y_train: train_idx.iter().map(|&i| y[i]).collect(),
        y_test: test_idx.iter().map(|&i| y[i]).collect(),
    })
}
