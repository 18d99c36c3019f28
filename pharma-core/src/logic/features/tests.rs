//! Transformer behaviour across fit/transform boundaries

use ndarray::{array, Axis};

use super::{FeatureSchema, FeatureStats, FeatureTable, FeatureTransformer, ScalerState};
use crate::error::PipelineError;
use crate::logic::dataset::SyntheticDataGenerator;

fn cols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn training_features() -> FeatureTable {
    let table = SyntheticDataGenerator::new(7).generate(500).unwrap();
    let (features, _) = table.split_target("treatment_effective").unwrap();
    features
}

#[test]
fn test_transformed_training_table_is_standardized() {
    let features = training_features();
    let mut transformer = FeatureTransformer::new();
    let scaled = transformer.fit_transform(&features).unwrap();

    let values = scaled.values();
    let n = values.nrows() as f64;
    for column in values.axis_iter(Axis(1)) {
        let mean = column.sum() / n;
        let std = (column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!(mean.abs() < 1e-9, "mean {} not ~0", mean);
        assert!((std - 1.0).abs() < 1e-9, "std {} not ~1", std);
    }
}

#[test]
fn test_schema_frozen_from_column_order() {
    let features = training_features();
    let mut transformer = FeatureTransformer::new();
    let schema = transformer.fit(&features).unwrap().clone();

    assert_eq!(schema.names(), features.columns());
    assert_eq!(schema.len(), 8);
    assert_eq!(schema.names()[0], "drug_concentration");
}

#[test]
fn test_transform_before_fit_is_schema_mismatch() {
    let transformer = FeatureTransformer::new();
    let table = FeatureTable::new(cols(&["a"]), array![[1.0]]).unwrap();

    assert!(matches!(
        transformer.transform(&table),
        Err(PipelineError::SchemaMismatch { .. })
    ));
    assert!(matches!(
        transformer.transform_single(&[1.0]),
        Err(PipelineError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_second_fit_rejected() {
    let table = FeatureTable::new(cols(&["a"]), array![[1.0], [2.0]]).unwrap();
    let mut transformer = FeatureTransformer::new();
    transformer.fit(&table).unwrap();

    assert!(matches!(
        transformer.fit(&table),
        Err(PipelineError::AlreadyFitted(_))
    ));
}

#[test]
fn test_missing_values_use_fit_time_median() {
    // median of [1, 2, 9] (NaN skipped) is 2
    let train = FeatureTable::new(
        cols(&["a"]),
        array![[1.0], [f64::NAN], [2.0], [9.0]],
    )
    .unwrap();
    let mut transformer = FeatureTransformer::new();
    transformer.fit(&train).unwrap();

    let stats = &transformer.state().unwrap().stats[0];
    assert_eq!(stats.median, Some(2.0));
    // imputed column is [1, 2, 2, 9]
    assert!((stats.mean - 3.5).abs() < 1e-12);

    // A serving batch with a very different distribution must still use 2.0
    let serving = FeatureTable::new(cols(&["a"]), array![[f64::NAN], [100.0], [200.0]]).unwrap();
    let scaled = transformer.transform(&serving).unwrap();
    let expected = (2.0 - stats.mean) / stats.std;
    assert!((scaled.values()[[0, 0]] - expected).abs() < 1e-12);

    let single = transformer.transform_single(&[f64::NAN]).unwrap();
    assert!((single[0] - expected).abs() < 1e-12);
}

#[test]
fn test_zero_variance_column_does_not_produce_nan() {
    let table = FeatureTable::new(cols(&["flat", "x"]), array![[3.0, 1.0], [3.0, 2.0]]).unwrap();
    let mut transformer = FeatureTransformer::new();
    let scaled = transformer.fit_transform(&table).unwrap();

    assert_eq!(transformer.state().unwrap().stats[0].std, 1.0);
    assert!(scaled.values().iter().all(|v| v.is_finite()));
    assert_eq!(scaled.values()[[0, 0]], 0.0);
}

#[test]
fn test_all_missing_column_rejected() {
    let table = FeatureTable::new(cols(&["a"]), array![[f64::NAN], [f64::NAN]]).unwrap();
    let mut transformer = FeatureTransformer::new();
    assert!(matches!(
        transformer.fit(&table),
        Err(PipelineError::InvalidData(_))
    ));
    assert!(!transformer.is_fitted());
}

#[test]
fn test_transform_selects_schema_columns_from_superset() {
    let train = FeatureTable::new(cols(&["a", "b"]), array![[1.0, 10.0], [3.0, 30.0]]).unwrap();
    let mut transformer = FeatureTransformer::new();
    transformer.fit(&train).unwrap();

    let wider = FeatureTable::new(
        cols(&["extra", "b", "a"]),
        array![[99.0, 20.0, 2.0]],
    )
    .unwrap();
    let scaled = transformer.transform(&wider).unwrap();
    assert_eq!(scaled.columns(), cols(&["a", "b"]).as_slice());
    assert!(scaled.values().iter().all(|v| v.abs() < 1e-12));

    let narrower = FeatureTable::new(cols(&["a"]), array![[2.0]]).unwrap();
    assert!(matches!(
        transformer.transform(&narrower),
        Err(PipelineError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_transform_single_width_mismatch() {
    let features = training_features();
    let mut transformer = FeatureTransformer::new();
    transformer.fit(&features).unwrap();

    assert!(transformer.transform_single(&[1.0; 8]).is_ok());
    assert!(matches!(
        transformer.transform_single(&[1.0; 7]),
        Err(PipelineError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_from_state_validates() {
    let schema = FeatureSchema::new(cols(&["a", "b"])).unwrap();
    let one = ScalerState {
        stats: vec![FeatureStats { mean: 0.0, std: 1.0, median: None }],
    };
    assert!(FeatureTransformer::from_state(schema.clone(), one).is_err());

    let bad_std = ScalerState {
        stats: vec![
            FeatureStats { mean: 0.0, std: 0.0, median: None },
            FeatureStats { mean: 0.0, std: 1.0, median: None },
        ],
    };
    assert!(matches!(
        FeatureTransformer::from_state(schema.clone(), bad_std),
        Err(PipelineError::CorruptArtifact(_))
    ));

    // Without a stored median, missing values fall back to the mean
    let legacy = ScalerState {
        stats: vec![
            FeatureStats { mean: 5.0, std: 2.0, median: None },
            FeatureStats { mean: 0.0, std: 1.0, median: None },
        ],
    };
    let transformer = FeatureTransformer::from_state(schema, legacy).unwrap();
    assert_eq!(transformer.transform_single(&[f64::NAN, 1.0]).unwrap(), vec![0.0, 1.0]);
}
