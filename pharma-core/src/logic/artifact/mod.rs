//! Artifact Module - Durable model bundle
//!
//! One file holds everything inference needs: the feature schema, the
//! scaler statistics, the classifier coefficients and the training metrics.
//! Files are wrapped in a checksummed envelope and replaced atomically.

pub mod bundle;
pub mod storage;


pub use bundle::ModelArtifact;
pub use storage::{load_artifact, save_artifact};
