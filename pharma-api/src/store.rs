//! Prediction store
//!
//! Records every served prediction. The in-memory implementation is a
//! bounded ring: once full, the oldest record is evicted on each insert.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pharma_core::{ConfidenceTier, PredictionResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("prediction store unavailable: {0}")]
    Unavailable(String),
}

/// One served prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub prediction_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Raw request features; `None` marks a value the model imputed
    pub features: Vec<Option<f64>>,
    pub prediction: u8,
    pub probability: f64,
    pub confidence: ConfidenceTier,
    pub model_version: String,
    pub request_source: String,
}

impl PredictionRecord {
    /// `id` and `prediction_id` share one UUID: the id returned to the client
    pub fn new(features: Vec<Option<f64>>, result: &PredictionResult, model_version: &str) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            prediction_id: id,
            timestamp: Utc::now(),
            features,
            prediction: result.predicted_class,
            probability: result.max_probability,
            confidence: result.confidence_tier,
            model_version: model_version.to_string(),
            request_source: "api".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionStats {
    pub total_predictions: usize,
    pub effective_predictions: usize,
    pub non_effective_predictions: usize,
    /// Percentage of effective predictions, 0 when nothing is stored
    pub effectiveness_rate: f64,
    pub last_updated: DateTime<Utc>,
}

impl PredictionStats {
    fn from_counts(total: usize, effective: usize) -> Self {
        Self {
            total_predictions: total,
            effective_predictions: effective,
            non_effective_predictions: total - effective,
            effectiveness_rate: if total > 0 {
                effective as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            last_updated: Utc::now(),
        }
    }
}

pub type RecordFilter<'a> = &'a (dyn Fn(&PredictionRecord) -> bool + Send + Sync);

/// Document-store contract used by the handlers
pub trait PredictionStore: Send + Sync {
    /// Persist a record and return its id
    fn put(&self, record: PredictionRecord) -> Result<Uuid, StoreError>;

    /// Records matching `filter`, newest first, at most `limit`
    fn query(&self, filter: RecordFilter<'_>, limit: usize) -> Result<Vec<PredictionRecord>, StoreError>;

    fn stats(&self) -> Result<PredictionStats, StoreError> {
        let total = self.query(&|_| true, usize::MAX)?.len();
        let effective = self.query(&|r| r.prediction == 1, usize::MAX)?.len();
        Ok(PredictionStats::from_counts(total, effective))
    }

    fn health_check(&self) -> bool;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

pub struct InMemoryStore {
    capacity: usize,
    records: RwLock<VecDeque<PredictionRecord>>,
}

impl InMemoryStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }
}

impl PredictionStore for InMemoryStore {
    fn put(&self, record: PredictionRecord) -> Result<Uuid, StoreError> {
        let id = record.id;
        let mut records = self.records.write();
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);

        tracing::debug!("Prediction stored with ID: {}", id);
        Ok(id)
    }

    fn query(&self, filter: RecordFilter<'_>, limit: usize) -> Result<Vec<PredictionRecord>, StoreError> {
        let records = self.records.read();
        Ok(records
            .iter()
            .rev()
            .filter(|r| filter(r))
            .take(limit)
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<PredictionStats, StoreError> {
        let records = self.records.read();
        let effective = records.iter().filter(|r| r.prediction == 1).count();
        Ok(PredictionStats::from_counts(records.len(), effective))
    }

    fn health_check(&self) -> bool {
        true
    }
}
