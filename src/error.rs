//! Error taxonomy for artifact loading and inference

use std::path::PathBuf;
use thiserror::Error;

/// Per-request inference failure. Both kinds are non-fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// Artifacts failed to load at startup; the service runs degraded
    #[error("model artifacts are unavailable")]
    ArtifactsUnavailable,

    /// The transform, predict or predict_proba call failed for any reason
    #[error("transform or predict failed: {0}")]
    TransformFailed(String),
}

impl InferenceError {
    /// Fold any internal failure into `TransformFailed`, keeping the full cause chain.
    pub fn transform(err: anyhow::Error) -> Self {
        InferenceError::TransformFailed(format!("{err:#}"))
    }
}

/// Failure to load one of the two artifacts from disk.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported artifact {}: {reason}", path.display())]
    Unsupported { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_keeps_cause_chain() {
        let err = anyhow::anyhow!("dimension mismatch").context("classifier predict");
        let folded = InferenceError::transform(err);
        assert_eq!(
            folded,
            InferenceError::TransformFailed("classifier predict: dimension mismatch".to_string())
        );
    }

    #[test]
    fn test_missing_artifact_message() {
        let err = ArtifactError::Missing {
            path: PathBuf::from("models/model.json"),
        };
        assert_eq!(err.to_string(), "artifact file not found: models/model.json");
    }
}
