//! Pharma ML API Server
//!
//! Serves treatment effectiveness predictions from one trained pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      PHARMA ML API                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────────┐   ┌───────────────┐  │
//! │  │  Router   │──►│ PredictionPipe │   │ MetricsCollec │  │
//! │  │  (Axum)   │   │ (pharma-core)  │   │ (prometheus)  │  │
//! │  └─────┬─────┘   └────────────────┘   └───────────────┘  │
//! │        ▼                                                 │
//! │  ┌───────────────┐                                       │
//! │  │ Prediction    │                                       │
//! │  │ Store         │                                       │
//! │  └───────────────┘                                       │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod monitoring;
mod store;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use pharma_core::PredictionPipeline;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use monitoring::MetricsCollector;
use store::{InMemoryStore, PredictionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let production = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pharma_api=debug,pharma_core=info,tower_http=debug".into()))
        .with(production.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!production).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Pharma ML API starting ({})...", config.environment);

    // Load or train the model off the async runtime
    let training = config.training.clone();
    let pipeline = tokio::task::spawn_blocking(move || PredictionPipeline::load_or_train(&training))
        .await
        .context("model initialization task panicked")?
        .context("failed to load or train the model")?;

    tracing::info!(
        "Model ready: version {}, {} features",
        pipeline.model_version(),
        pipeline.feature_schema().len()
    );

    let metrics = MetricsCollector::new().context("failed to register metrics")?;

    // Build application state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        store: Arc::new(InMemoryStore::new(config.store_capacity)),
        metrics: Arc::new(metrics),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    tracing::info!("Pharma ML API shut down");
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    pub store: Arc<dyn PredictionStore>,
    pub metrics: Arc<MetricsCollector>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))

        // Inference
        .route("/predict", post(handlers::predict::predict))

        // Model introspection
        .route("/model/info", get(handlers::model::info))
        .route("/model/features", get(handlers::model::features))
        .route("/model/importance", get(handlers::model::importance))

        // Stored predictions
        .route("/predictions/recent", get(handlers::predictions::recent))
        .route("/predictions/stats", get(handlers::predictions::stats))

        // Monitoring
        .route("/metrics", get(handlers::metrics::get))
        .route("/metrics/prometheus", get(handlers::metrics::prometheus))

        .fallback(handlers::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics::track_requests,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
