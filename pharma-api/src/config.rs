//! Configuration module

use std::env;

use pharma_core::TrainingConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Prediction records kept in memory before the oldest are evicted
    pub store_capacity: usize,

    /// Model artifact location and bootstrap training settings
    pub training: TrainingConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            store_capacity: env::var("STORE_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(10_000),

            training: TrainingConfig::from_env(),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
