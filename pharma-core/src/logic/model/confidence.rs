//! Confidence tiers and human readable interpretation
//!
//! Downstream consumers key off both the tier names and the exact message
//! strings, so the thresholds and texts here are fixed.

use serde::{Deserialize, Serialize};

use crate::constants::{HIGH_CONFIDENCE_THRESHOLD, MEDIUM_CONFIDENCE_THRESHOLD};

/// Coarse bucketing of max(p0, p1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Threshold values themselves belong to the lower tier
    pub fn from_probability(max_probability: f64) -> Self {
        if max_probability > HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceTier::High
        } else if max_probability > MEDIUM_CONFIDENCE_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message for a predicted class at a given max probability
pub fn interpret(predicted_class: u8, max_probability: f64) -> &'static str {
    match (predicted_class, ConfidenceTier::from_probability(max_probability)) {
        (1, ConfidenceTier::High) => "Treatment is highly likely to be effective",
        (1, ConfidenceTier::Medium) => "Treatment is likely to be effective",
        (1, ConfidenceTier::Low) => "Treatment may be effective (low confidence)",
        (_, ConfidenceTier::High) => "Treatment is highly unlikely to be effective",
        (_, ConfidenceTier::Medium) => "Treatment is unlikely to be effective",
        (_, ConfidenceTier::Low) => "Treatment effectiveness is uncertain",
    }
}
