//! Pharma ML - offline trainer
//!
//! Trains from `PHARMA_TRAINING_DATA` (JSONL) when set, otherwise from
//! synthetic data, and writes the artifact to `PHARMA_MODEL_PATH`.

use std::process::ExitCode;

use pharma_core::{
    load_jsonl_table, PipelineError, PredictionPipeline, SyntheticDataGenerator, TrainingConfig,
};

fn run() -> Result<(), PipelineError> {
    let config = TrainingConfig::from_env();
    log::info!("Training configuration: {:?}", config);

    let table = match &config.training_data {
        Some(path) => load_jsonl_table(path)?,
        None => SyntheticDataGenerator::new(config.seed).generate(config.n_samples)?,
    };

    let (pipeline, metrics) = PredictionPipeline::train(&table, &config)?;

    log::info!("Training samples: {}", metrics.n_samples);
    log::info!("Training accuracy: {:.4}", metrics.train_accuracy);
    log::info!("Training AUC: {:.4}", metrics.train_auc);
    if let (Some(accuracy), Some(samples)) = (metrics.test_accuracy, metrics.test_samples) {
        log::info!("Test accuracy: {:.4} on {} samples", accuracy, samples);
    }
    if let Some(auc) = metrics.test_auc {
        log::info!("Test AUC: {:.4}", auc);
    }
    if let Some(report) = &metrics.test_classification_report {
        for (class, scores) in &report.classes {
            log::info!(
                "  class {}: precision {:.3} recall {:.3} f1 {:.3} support {}",
                class,
                scores.precision,
                scores.recall,
                scores.f1_score,
                scores.support
            );
        }
    }

    log::info!("Feature importance:");
    for (name, weight) in pipeline.feature_importance()? {
        log::info!("  {:<28} {:.4}", name, weight);
    }

    pipeline.save(&config.model_path)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Training failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
