//! Classifier state machine and training behaviour

use ndarray::{array, Array2};

use super::{BinaryClassifier, ConfidenceTier, SolverParams};
use crate::error::PipelineError;
use crate::logic::dataset::{stratified_split, SyntheticDataGenerator};
use crate::logic::features::{FeatureTable, FeatureTransformer};

struct Prepared {
    x_train: FeatureTable,
    y_train: Vec<u8>,
    x_test: FeatureTable,
    y_test: Vec<u8>,
}

fn prepared(n: usize) -> Prepared {
    let table = SyntheticDataGenerator::new(42).generate(n).unwrap();
    let (features, labels) = table.split_target("treatment_effective").unwrap();
    let scaled = FeatureTransformer::new().fit_transform(&features).unwrap();
    let split = stratified_split(&scaled, &labels, 0.2, 42).unwrap();
    Prepared {
        x_train: split.x_train,
        y_train: split.y_train,
        x_test: split.x_test,
        y_test: split.y_test,
    }
}

fn trained(n: usize) -> (BinaryClassifier, Prepared) {
    let data = prepared(n);
    let mut clf = BinaryClassifier::default();
    clf.train(&data.x_train, &data.y_train, Some((&data.x_test, &data.y_test)))
        .unwrap();
    (clf, data)
}

#[test]
fn test_untrained_operations_fail() {
    let clf = BinaryClassifier::default();
    let table = FeatureTable::new(vec!["a".to_string()], array![[0.0]]).unwrap();

    assert!(matches!(clf.predict_single(&[0.0; 8]), Err(PipelineError::NotTrained)));
    assert!(matches!(clf.predict(&table), Err(PipelineError::NotTrained)));
    assert!(matches!(clf.predict_proba(&table), Err(PipelineError::NotTrained)));
    assert!(matches!(clf.feature_importance(), Err(PipelineError::NotTrained)));

    // Introspection still works
    let info = clf.get_model_info();
    assert!(!info.is_trained);
    assert_eq!(info.feature_count, 0);
    assert!(info.model_parameters.is_none());
    assert_eq!(info.model_version, "1.0.0");
}

#[test]
fn test_training_metrics_and_sanity_floor() {
    let (clf, data) = trained(2000);
    let metrics = clf.training_metrics().unwrap();

    assert_eq!(metrics.n_samples, data.x_train.n_rows());
    assert_eq!(metrics.n_features, 8);
    assert_eq!(metrics.test_samples, Some(400));
    assert!(metrics.train_accuracy > 0.6);
    assert!(metrics.test_accuracy.unwrap() > 0.6);
    assert!(metrics.test_auc.unwrap() > 0.6);

    let report = metrics.test_classification_report.as_ref().unwrap();
    assert_eq!(report.classes["0"].support + report.classes["1"].support, 400);
    assert_eq!(report.accuracy, metrics.test_accuracy.unwrap());
}

#[test]
fn test_second_train_rejected() {
    let (mut clf, data) = trained(300);
    assert!(matches!(
        clf.train(&data.x_train, &data.y_train, None),
        Err(PipelineError::AlreadyFitted(_))
    ));
}

#[test]
fn test_single_class_is_training_failure() {
    let x = FeatureTable::new(vec!["a".to_string()], array![[0.1], [0.2], [0.3]]).unwrap();
    let mut clf = BinaryClassifier::default();
    assert!(matches!(
        clf.train(&x, &[1, 1, 1], None),
        Err(PipelineError::TrainingFailure(_))
    ));
    assert!(!clf.is_trained());
}

#[test]
fn test_invalid_labels_rejected() {
    let x = FeatureTable::new(vec!["a".to_string()], array![[0.1], [0.2]]).unwrap();
    let mut clf = BinaryClassifier::default();
    assert!(clf.train(&x, &[0, 2], None).is_err());
    assert!(clf.train(&x, &[0], None).is_err());
}

#[test]
fn test_predict_proba_rows_sum_to_one() {
    let (clf, data) = trained(500);
    let proba = clf.predict_proba(&data.x_test).unwrap();
    let labels = clf.predict(&data.x_test).unwrap();

    assert_eq!(proba.nrows(), data.x_test.n_rows());
    for (row, &label) in proba.rows().into_iter().zip(&labels) {
        assert!((row[0] + row[1] - 1.0).abs() < 1e-12);
        assert_eq!(label, u8::from(row[1] > 0.5));
    }
}

#[test]
fn test_predict_checks_column_order() {
    let (clf, data) = trained(300);
    let mut reversed = data.x_test.columns().to_vec();
    reversed.reverse();
    let shuffled = data.x_test.select(&reversed).unwrap();

    assert!(matches!(
        clf.predict(&shuffled),
        Err(PipelineError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_batch_inference_rejects_non_finite_rows() {
    let (clf, data) = trained(300);
    let mut values = Array2::<f64>::zeros((2, 8));
    values[[1, 0]] = f64::NAN;
    let table = FeatureTable::new(data.x_test.columns().to_vec(), values).unwrap();

    assert!(matches!(clf.predict(&table), Err(PipelineError::InvalidData(_))));
    assert!(matches!(clf.predict_proba(&table), Err(PipelineError::InvalidData(_))));
    assert!(matches!(
        clf.predict_single(&table.row(1).unwrap().to_vec()),
        Err(PipelineError::InvalidData(_))
    ));
}

#[test]
fn test_predict_single_result() {
    let (clf, _) = trained(500);

    let result = clf.predict_single(&[0.3, -0.2, 0.0, 0.5, 0.1, 0.4, 0.9, 0.2]).unwrap();
    assert!(result.predicted_class <= 1);
    assert!((result.probability_class_0 + result.probability_class_1 - 1.0).abs() < 1e-12);
    assert_eq!(
        result.max_probability,
        result.probability_class_0.max(result.probability_class_1)
    );
    assert_eq!(
        result.confidence_tier,
        ConfidenceTier::from_probability(result.max_probability)
    );
    assert!(!result.interpretation.is_empty());

    assert!(matches!(
        clf.predict_single(&[0.0; 7]),
        Err(PipelineError::SchemaMismatch { .. })
    ));
    assert!(matches!(
        clf.predict_single(&[f64::NAN; 8]),
        Err(PipelineError::InvalidData(_))
    ));
}

#[test]
fn test_feature_importance_sorted() {
    let (clf, _) = trained(2000);
    let importance = clf.feature_importance().unwrap();

    assert_eq!(importance.len(), 8);
    assert!(importance.windows(2).all(|w| w[0].1 >= w[1].1));
    assert!(importance.iter().all(|(_, v)| *v >= 0.0));
    // The label is built mostly from these two
    let top: Vec<&str> = importance[..3].iter().map(|(n, _)| n.as_str()).collect();
    assert!(top.contains(&"drug_concentration") || top.contains(&"biomarker_level"));
}

#[test]
fn test_model_info_when_trained() {
    let params = SolverParams { c: 0.5, ..Default::default() };
    let data = prepared(300);
    let mut clf = BinaryClassifier::new(params).with_version("2.1.0");
    clf.train(&data.x_train, &data.y_train, None).unwrap();

    let info = clf.get_model_info();
    assert!(info.is_trained);
    assert_eq!(info.model_version, "2.1.0");
    assert_eq!(info.model_type, "Logistic Regression");
    assert_eq!(info.feature_count, 8);
    let parameters = info.model_parameters.unwrap();
    assert_eq!(parameters.c, 0.5);
    assert_eq!(parameters.solver, "lbfgs");
    assert_eq!(parameters.max_iter, 1000);

    let metrics = info.training_metrics.unwrap();
    assert!(metrics.test_accuracy.is_none());

    let json = serde_json::to_value(clf.get_model_info()).unwrap();
    assert_eq!(json["model_parameters"]["C"], 0.5);
}
