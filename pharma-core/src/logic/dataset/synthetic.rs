//! Synthetic pharmaceutical data
//!
//! Feature distributions:
//!
//! | feature                 | distribution          |
//! |-------------------------|-----------------------|
//! | drug_concentration      | Normal(10, 2)         |
//! | patient_age             | UniformInt[18, 80)    |
//! | patient_weight          | Normal(70, 15)        |
//! | dosage_mg               | Normal(500, 100)      |
//! | treatment_duration_days | UniformInt[7, 90)     |
//! | biomarker_level         | Normal(5, 1.5)        |
//! | liver_function_score    | Uniform[0.5, 1.0)     |
//! | kidney_function_score   | Uniform[0.6, 1.0)     |
//!
//! The label compares a noisy linear effectiveness score against the batch's
//! own median, so every batch is balanced by construction.

use ndarray::Array2;
use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use statrs::distribution::Normal;

use crate::constants::TARGET_COLUMN;
use crate::error::{PipelineError, Result};
use crate::logic::features::FeatureTable;
use crate::logic::numeric::median;

pub const PHARMA_FEATURES: [&str; 8] = [
    "drug_concentration",
    "patient_age",
    "patient_weight",
    "dosage_mg",
    "treatment_duration_days",
    "biomarker_level",
    "liver_function_score",
    "kidney_function_score",
];

const NOISE_STD: f64 = 0.1;

/// Deterministic generator: the same seed and size always yield the same table
#[derive(Debug, Clone)]
pub struct SyntheticDataGenerator {
    seed: u64,
}

impl SyntheticDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `n_samples` rows of the eight features followed by the label column
    pub fn generate(&self, n_samples: usize) -> Result<FeatureTable> {
        if n_samples == 0 {
            return Err(PipelineError::InvalidData(
                "synthetic dataset needs at least one sample".to_string(),
            ));
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);

        // Column by column, in schema order
        let drug_concentration = normal_column(&mut rng, 10.0, 2.0, n_samples)?;
        let patient_age = int_column(&mut rng, 18, 80, n_samples);
        let patient_weight = normal_column(&mut rng, 70.0, 15.0, n_samples)?;
        let dosage_mg = normal_column(&mut rng, 500.0, 100.0, n_samples)?;
        let treatment_duration_days = int_column(&mut rng, 7, 90, n_samples);
        let biomarker_level = normal_column(&mut rng, 5.0, 1.5, n_samples)?;
        let liver_function_score = uniform_column(&mut rng, 0.5, 1.0, n_samples);
        let kidney_function_score = uniform_column(&mut rng, 0.6, 1.0, n_samples);
        let noise = normal_column(&mut rng, 0.0, NOISE_STD, n_samples)?;

        let scores: Vec<f64> = (0..n_samples)
            .map(|i| {
                (drug_concentration[i] - 10.0) * 0.1
                    + (1.0 / (1.0 + (patient_age[i] - 45.0).abs() * 0.02)) * 0.3
                    + (dosage_mg[i] / 1000.0) * 0.2
                    + biomarker_level[i] * 0.1
                    + liver_function_score[i] * 0.2
                    + kidney_function_score[i] * 0.1
                    + noise[i]
            })
            .collect();

        let cutoff = median(scores.iter().copied()).ok_or_else(|| {
            PipelineError::InvalidData("effectiveness score has no finite values".to_string())
        })?;

        let columns = [
            &drug_concentration,
            &patient_age,
            &patient_weight,
            &dosage_mg,
            &treatment_duration_days,
            &biomarker_level,
            &liver_function_score,
            &kidney_function_score,
        ];

        let width = PHARMA_FEATURES.len() + 1;
        let values = Array2::from_shape_fn((n_samples, width), |(row, col)| {
            if col < PHARMA_FEATURES.len() {
                columns[col][row]
            } else if scores[row] > cutoff {
                1.0
            } else {
                0.0
            }
        });

        let mut names: Vec<String> = PHARMA_FEATURES.iter().map(|s| s.to_string()).collect();
        names.push(TARGET_COLUMN.to_string());

        let positives = scores.iter().filter(|&&s| s > cutoff).count();
        log::info!("Created synthetic dataset with {} samples", n_samples);
        log::info!(
            "Treatment effectiveness distribution: {{0: {}, 1: {}}}",
            n_samples - positives,
            positives
        );

        FeatureTable::new(names, values)
    }
}

fn normal_column(rng: &mut Xoshiro256PlusPlus, mean: f64, std: f64, n: usize) -> Result<Vec<f64>> {
    let dist = Normal::new(mean, std).map_err(|e| PipelineError::InvalidData(e.to_string()))?;
    Ok((0..n).map(|_| dist.sample(rng)).collect())
}

fn int_column(rng: &mut Xoshiro256PlusPlus, low: i64, high: i64, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(low..high) as f64).collect()
}

fn uniform_column(rng: &mut Xoshiro256PlusPlus, low: f64, high: f64, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(low..high)).collect()
}
