//! Evaluation metrics for binary classification

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fraction of exact label matches. Empty input scores 0.
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Area under the ROC curve via the rank-sum statistic, averaging ranks
/// across tied scores. `None` when only one class is present.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n = y_true.len();
    let n_pos = y_true.iter().filter(|&&y| y == 1).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    // Ascending ranks, 1-based
    let mut rank_sum_pos = 0.0f64;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[order[j]] == scores[order[i]] {
            j += 1;
        }

        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            if y_true[idx] == 1 {
                rank_sum_pos += avg_rank;
            }
        }
        i = j;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

// ============================================================================
// CLASSIFICATION REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1 plus macro and support-weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Keyed by class label ("0", "1")
    pub classes: BTreeMap<String, ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn compute(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut classes = BTreeMap::new();

        for class in [0u8, 1u8] {
            let tp = count(y_true, y_pred, |t, p| t == class && p == class);
            let fp = count(y_true, y_pred, |t, p| t != class && p == class);
            let fn_ = count(y_true, y_pred, |t, p| t == class && p != class);

            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + fn_);
            let f1_score = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            classes.insert(
                class.to_string(),
                ClassScores {
                    precision,
                    recall,
                    f1_score,
                    support: tp + fn_,
                },
            );
        }

        let macro_avg = weighted_mean(&classes, |_| 1.0);
        let weighted_avg = weighted_mean(&classes, |c| c.support as f64);

        Self {
            accuracy: accuracy(y_true, y_pred),
            classes,
            macro_avg,
            weighted_avg,
        }
    }
}

fn weighted_mean(
    classes: &BTreeMap<String, ClassScores>,
    weight: impl Fn(&ClassScores) -> f64,
) -> ClassScores {
    let support = classes.values().map(|c| c.support).sum();
    let total_weight: f64 = classes.values().map(&weight).sum();
    if total_weight <= 0.0 {
        return ClassScores {
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            support,
        };
    }

    let mean = |field: fn(&ClassScores) -> f64| {
        classes.values().map(|c| weight(c) * field(c)).sum::<f64>() / total_weight
    };
    ClassScores {
        precision: mean(|c| c.precision),
        recall: mean(|c| c.recall),
        f1_score: mean(|c| c.f1_score),
        support,
    }
}

fn count(y_true: &[u8], y_pred: &[u8], pred: impl Fn(u8, u8) -> bool) -> usize {
    y_true.iter().zip(y_pred).filter(|&(&t, &p)| pred(t, p)).count()
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

// ============================================================================
// TRAINING METRICS
// ============================================================================

/// Snapshot taken once at training time and persisted with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub train_accuracy: f64,
    pub train_auc: f64,
    pub training_date: DateTime<Utc>,
    pub n_samples: usize,
    pub n_features: usize,
    pub feature_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_auc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_samples: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_classification_report: Option<ClassificationReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1, 0, 1, 1], &[1, 0, 0, 1]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_auc_perfect_and_inverted() {
        let labels = [0, 0, 1, 1];
        assert_eq!(roc_auc(&labels, &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
        assert_eq!(roc_auc(&labels, &[0.9, 0.8, 0.2, 0.1]), Some(0.0));
    }

    #[test]
    fn test_auc_ties_count_half() {
        // Every positive/negative pair is tied
        assert_eq!(roc_auc(&[0, 1, 0, 1], &[0.5; 4]), Some(0.5));
        // One of four pairs inverted
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.6, 0.4, 0.9]), Some(0.75));
    }

    #[test]
    fn test_auc_single_class() {
        assert_eq!(roc_auc(&[1, 1, 1], &[0.2, 0.5, 0.9]), None);
    }

    #[test]
    fn test_classification_report() {
        let y_true = [1, 1, 1, 0, 0];
        let y_pred = [1, 1, 0, 0, 1];
        let report = ClassificationReport::compute(&y_true, &y_pred);

        let one = &report.classes["1"];
        assert!((one.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((one.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(one.support, 3);

        let zero = &report.classes["0"];
        assert_eq!(zero.precision, 0.5);
        assert_eq!(zero.recall, 0.5);
        assert_eq!(zero.support, 2);

        assert_eq!(report.accuracy, 0.6);
        assert_eq!(report.macro_avg.support, 5);
        let expected_weighted = (3.0 * one.f1_score + 2.0 * zero.f1_score) / 5.0;
        assert!((report.weighted_avg.f1_score - expected_weighted).abs() < 1e-12);
    }

    #[test]
    fn test_report_zero_division() {
        let report = ClassificationReport::compute(&[0, 0], &[0, 0]);
        let one = &report.classes["1"];
        assert_eq!(one.precision, 0.0);
        assert_eq!(one.f1_score, 0.0);
        assert_eq!(one.support, 0);
    }
}
