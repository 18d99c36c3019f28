use std::fs;

use ndarray::array;
use tempfile::tempdir;

use super::{load_jsonl_table, stratified_split, SyntheticDataGenerator, PHARMA_FEATURES};
use crate::error::PipelineError;
use crate::logic::features::FeatureTable;

#[test]
fn test_synthetic_is_deterministic() {
    let a = SyntheticDataGenerator::new(42).generate(2000).unwrap();
    let b = SyntheticDataGenerator::new(42).generate(2000).unwrap();
    assert_eq!(a, b);

    let c = SyntheticDataGenerator::new(43).generate(2000).unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_synthetic_labels_balanced() {
    for n in [2000, 1001, 37] {
        let table = SyntheticDataGenerator::new(42).generate(n).unwrap();
        let (_, labels) = table.split_target("treatment_effective").unwrap();
        let positives = labels.iter().filter(|&&l| l == 1).count() as i64;
        let negatives = n as i64 - positives;
        assert!((positives - negatives).abs() <= 1, "n={} split {}/{}", n, negatives, positives);
    }
}

#[test]
fn test_synthetic_schema_and_ranges() {
    let table = SyntheticDataGenerator::new(1).generate(500).unwrap();
    assert_eq!(table.n_cols(), 9);
    assert_eq!(&table.columns()[..8], PHARMA_FEATURES.map(String::from).as_slice());

    let age = table.column("patient_age").unwrap();
    assert!(age.iter().all(|&a| (18.0..80.0).contains(&a) && a.fract() == 0.0));

    let days = table.column("treatment_duration_days").unwrap();
    assert!(days.iter().all(|&d| (7.0..90.0).contains(&d) && d.fract() == 0.0));

    let liver = table.column("liver_function_score").unwrap();
    assert!(liver.iter().all(|&v| (0.5..1.0).contains(&v)));

    let kidney = table.column("kidney_function_score").unwrap();
    assert!(kidney.iter().all(|&v| (0.6..1.0).contains(&v)));

    let drug = table.column("drug_concentration").unwrap();
    let mean = drug.sum() / drug.len() as f64;
    assert!((mean - 10.0).abs() < 0.5);
}

#[test]
fn test_synthetic_rejects_empty() {
    assert!(SyntheticDataGenerator::new(42).generate(0).is_err());
}

#[test]
fn test_stratified_split_proportions() {
    let table = SyntheticDataGenerator::new(42).generate(2000).unwrap();
    let (features, labels) = table.split_target("treatment_effective").unwrap();

    let split = stratified_split(&features, &labels, 0.2, 42).unwrap();
    assert_eq!(split.x_train.n_rows(), 1600);
    assert_eq!(split.x_test.n_rows(), 400);
    assert_eq!(split.y_test.iter().filter(|&&l| l == 1).count(), 200);
    assert_eq!(split.y_train.iter().filter(|&&l| l == 1).count(), 800);

    let again = stratified_split(&features, &labels, 0.2, 42).unwrap();
    assert_eq!(split.x_test, again.x_test);
    assert_eq!(split.y_test, again.y_test);
}

#[test]
fn test_stratified_split_keeps_rows_aligned() {
    let x = FeatureTable::new(
        vec!["id".to_string()],
        array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0], [9.0]],
    )
    .unwrap();
    let y = [0, 1, 0, 1, 0, 1, 0, 1, 0, 1];

    let split = stratified_split(&x, &y, 0.2, 7).unwrap();
    for (row, &label) in split.x_test.values().rows().into_iter().zip(&split.y_test) {
        assert_eq!(y[row[0] as usize], label);
    }
    for (row, &label) in split.x_train.values().rows().into_iter().zip(&split.y_train) {
        assert_eq!(y[row[0] as usize], label);
    }
}

#[test]
fn test_stratified_split_invalid() {
    let x = FeatureTable::new(vec!["a".to_string()], array![[0.0], [1.0]]).unwrap();
    assert!(stratified_split(&x, &[0, 1], 0.0, 1).is_err());
    assert!(stratified_split(&x, &[0, 1], 1.0, 1).is_err());
    assert!(stratified_split(&x, &[0], 0.5, 1).is_err());
    // round(0.2 * 1) = 0 for both classes: empty test partition
    assert!(stratified_split(&x, &[0, 1], 0.2, 1).is_err());
}

#[test]
fn test_load_jsonl_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("train.jsonl");
    fs::write(
        &path,
        concat!(
            "{\"dose\": 1.5, \"age\": 40, \"treatment_effective\": 1}\n",
            "\n",
            "{\"dose\": null, \"age\": 51, \"treatment_effective\": 0}\n",
            "{\"age\": 62, \"treatment_effective\": 1}\n",
        ),
    )
    .unwrap();

    let table = load_jsonl_table(&path).unwrap();
    assert_eq!(table.columns(), ["dose", "age", "treatment_effective"].map(String::from).as_slice());
    assert_eq!(table.n_rows(), 3);

    let dose = table.column("dose").unwrap();
    assert_eq!(dose[0], 1.5);
    assert!(dose[1].is_nan() && dose[2].is_nan());
}

#[test]
fn test_load_jsonl_errors() {
    let dir = tempdir().unwrap();

    let missing = dir.path().join("missing.jsonl");
    assert!(matches!(load_jsonl_table(&missing), Err(PipelineError::NotFound(_))));

    let bad = dir.path().join("bad.jsonl");
    fs::write(&bad, "{\"dose\": \"high\"}\n").unwrap();
    assert!(matches!(load_jsonl_table(&bad), Err(PipelineError::InvalidData(_))));

    let extra = dir.path().join("extra.jsonl");
    fs::write(&extra, "{\"a\": 1}\n{\"a\": 2, \"b\": 3}\n").unwrap();
    assert!(matches!(load_jsonl_table(&extra), Err(PipelineError::InvalidData(_))));

    let empty = dir.path().join("empty.jsonl");
    fs::write(&empty, "\n").unwrap();
    assert!(load_jsonl_table(&empty).is_err());
}
