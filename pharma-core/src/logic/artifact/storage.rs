//! Checksummed artifact files
//!
//! On disk an artifact is an envelope `{format_version, checksum, bundle}`
//! where `bundle` is the serialized `ModelArtifact` and `checksum` its
//! SHA-256. A bare bundle without the envelope is still accepted.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::bundle::ModelArtifact;
use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::error::{PipelineError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactFile {
    format_version: u32,

    /// Hex SHA-256 of `bundle`
    checksum: String,

    bundle: String,
}

/// Serialize and atomically replace the file at `path`
pub fn save_artifact(artifact: &ModelArtifact, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let bundle = serde_json::to_string(artifact)?;
    let file = ArtifactFile {
        format_version: ARTIFACT_FORMAT_VERSION,
        checksum: checksum(&bundle),
        bundle,
    };
    let content = serde_json::to_vec_pretty(&file)?;

    let tmp_path = temp_path(path);
    let written = write_synced(&tmp_path, &content).and_then(|_| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    log::info!(
        "Model saved to {} (version {}, {} features)",
        path.display(),
        artifact.model_version,
        artifact.feature_schema.len()
    );
    Ok(())
}

/// Read, verify and decode the artifact at `path`
pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PipelineError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let value: serde_json::Value = serde_json::from_slice(&content)
        .map_err(|e| PipelineError::CorruptArtifact(format!("unreadable artifact: {}", e)))?;

    let artifact: ModelArtifact = if value.get("bundle").is_some() {
        let file: ArtifactFile = serde_json::from_value(value)
            .map_err(|e| PipelineError::CorruptArtifact(e.to_string()))?;

        if file.format_version > ARTIFACT_FORMAT_VERSION {
            return Err(PipelineError::CorruptArtifact(format!(
                "unsupported artifact format version {}",
                file.format_version
            )));
        }
        if checksum(&file.bundle) != file.checksum.to_ascii_lowercase() {
            return Err(PipelineError::CorruptArtifact(
                "checksum mismatch (file modified or truncated)".to_string(),
            ));
        }

        serde_json::from_str(&file.bundle)
            .map_err(|e| PipelineError::CorruptArtifact(e.to_string()))?
    } else {
        log::warn!("Artifact {} has no checksum envelope", path.display());
        serde_json::from_value(value).map_err(|e| PipelineError::CorruptArtifact(e.to_string()))?
    };

    log::info!(
        "Model loaded from {} (version {}, {} features)",
        path.display(),
        artifact.model_version,
        artifact.feature_schema.len()
    );
    Ok(artifact)
}

fn checksum(bundle: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bundle.as_bytes());
    hex::encode(hasher.finalize())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}
