//! Sentiment inference over the loaded artifacts

use crate::config::ArtifactsConfig;
use crate::error::InferenceError;
use crate::models::loader::{ArtifactLoader, Artifacts};
use crate::types::{Confidence, PredictionDisplay};
use anyhow::Context;
use tracing::{debug, info, warn};

/// Whether the startup load succeeded
#[derive(Debug)]
pub enum ArtifactState {
    Ready(Artifacts),
    /// Degraded mode: every request fails with `ArtifactsUnavailable`
    Unavailable { reason: String },
}

/// Inference service owning the read-only artifacts.
///
/// `predict` takes `&self` and touches no mutable state, so identical input
/// against the same artifacts always yields the same outcome.
#[derive(Debug)]
pub struct InferenceService {
    state: ArtifactState,
}

impl InferenceService {
    /// Service over already loaded artifacts
    pub fn new(artifacts: Artifacts) -> Self {
        Self {
            state: ArtifactState::Ready(artifacts),
        }
    }

    /// Service in degraded mode
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ArtifactState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// Load artifacts from configured paths. Never fails; a failed load degrades the service.
    pub fn from_config(config: &ArtifactsConfig) -> Self {
        match ArtifactLoader::new(config).load() {
            Ok(artifacts) => {
                info!("Inference service ready");
                Self::new(artifacts)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load artifacts, running without a model");
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ArtifactState::Ready(_))
    }

    /// Why the startup load failed, if it did
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ArtifactState::Ready(_) => None,
            ArtifactState::Unavailable { reason } => Some(reason),
        }
    }

    /// Predict the sentiment of `text`.
    ///
    /// Callers reject whitespace-only input before calling this.
    pub fn predict(
        &self,
        text: &str,
        want_confidence: bool,
    ) -> Result<PredictionDisplay, InferenceError> {
        let artifacts = match &self.state {
            ArtifactState::Ready(artifacts) => artifacts,
            ArtifactState::Unavailable { .. } => return Err(InferenceError::ArtifactsUnavailable),
        };

        let features = artifacts
            .vectorizer
            .transform(text)
            .context("vectorizer transform")
            .map_err(InferenceError::transform)?;

        let label = artifacts
            .classifier
            .predict(&features)
            .context("classifier predict")
            .map_err(InferenceError::transform)?;

        let confidence = if want_confidence {
            let probabilities = artifacts
                .classifier
                .predict_proba(&features)
                .context("classifier predict_proba")
                .map_err(InferenceError::transform)?;
            let confidence = Confidence::from_probabilities(&probabilities).ok_or_else(|| {
                InferenceError::TransformFailed("empty probability distribution".to_string())
            })?;
            Some(confidence)
        } else {
            None
        };

        debug!(
            features = features.nnz(),
            label = %label,
            confidence = ?confidence.map(|c| c.percent()),
            "Inference complete"
        );

        Ok(PredictionDisplay::new(label, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::{FailingVectorizer, FixedClassifier, FixedVectorizer};
    use crate::types::Sentiment;

    fn service(label: &str, probabilities: Option<Vec<f64>>) -> InferenceService {
        InferenceService::new(Artifacts::new(
            FixedVectorizer::default(),
            FixedClassifier::new(label, probabilities),
        ))
    }

    #[test]
    fn test_positive_without_confidence() {
        let service = service("positive", Some(vec![0.1, 0.9]));
        for text in ["great", "  loved it  ", "ok\nfine"] {
            let display = service.predict(text, false).unwrap();
            assert_eq!(display.sentiment, Sentiment::Positive);
            assert_eq!(display.confidence, None);
        }
    }

    #[test]
    fn test_negative_label() {
        let display = service("negative", None).predict("awful", false).unwrap();
        assert_eq!(display.sentiment, Sentiment::Negative);
        assert_eq!(display.label, "negative");
    }

    #[test]
    fn test_unrecognized_labels_are_neutral() {
        for label in ["neutral", "mixed", "POSITIVE", "1"] {
            let display = service(label, None).predict("meh", false).unwrap();
            assert_eq!(display.sentiment, Sentiment::Neutral, "label {label}");
            assert_eq!(display.label, label);
        }
    }

    #[test]
    fn test_confidence_is_max_probability_percent() {
        let display = service("positive", Some(vec![0.7, 0.3]))
            .predict("good", true)
            .unwrap();
        assert_eq!(display.confidence.map(|c| c.percent()), Some(70.00));
    }

    #[test]
    fn test_unavailable_regardless_of_input() {
        let service = InferenceService::unavailable("model.json missing");
        assert!(!service.is_available());
        assert_eq!(service.unavailable_reason(), Some("model.json missing"));
        for text in ["good", "", "   ", "bad"] {
            for want_confidence in [false, true] {
                assert_eq!(
                    service.predict(text, want_confidence),
                    Err(InferenceError::ArtifactsUnavailable)
                );
            }
        }
    }

    #[test]
    fn test_transform_failure() {
        let service = InferenceService::new(Artifacts::new(
            FailingVectorizer,
            FixedClassifier::new("positive", None),
        ));
        let err = service.predict("anything", false).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::TransformFailed(ref msg) if msg.starts_with("vectorizer transform")
        ));
    }

    #[test]
    fn test_missing_probabilities_fold_into_transform_failed() {
        let service = service("positive", None);
        assert!(service.predict("good", false).is_ok());
        assert!(matches!(
            service.predict("good", true),
            Err(InferenceError::TransformFailed(_))
        ));
    }

    #[test]
    fn test_empty_distribution_fails() {
        let service = service("positive", Some(vec![]));
        assert!(matches!(
            service.predict("good", true),
            Err(InferenceError::TransformFailed(_))
        ));
    }

    #[test]
    fn test_idempotent() {
        let service = service("neutral", Some(vec![0.2, 0.5, 0.3]));
        let first = service.predict("the same words", true);
        let second = service.predict("the same words", true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config_degrades_on_missing_files() {
        let config = ArtifactsConfig {
            dir: std::env::temp_dir()
                .join(format!("sentiment-form-absent-{}", uuid::Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            ..ArtifactsConfig::default()
        };
        let service = InferenceService::from_config(&config);
        assert!(!service.is_available());
        assert_eq!(
            service.predict("good", false),
            Err(InferenceError::ArtifactsUnavailable)
        );
    }
}
