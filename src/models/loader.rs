//! Artifact loader for the vectorizer and classifier

use crate::config::ArtifactsConfig;
use crate::error::ArtifactError;
use crate::models::classifier::{Classifier, LinearClassifier, LinearModel, NaiveBayesClassifier};
use crate::vectorizer::{TfidfVectorizer, Vectorizer};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Loaded vectorizer and classifier, immutable for the process lifetime
pub struct Artifacts {
    pub vectorizer: Box<dyn Vectorizer>,
    pub classifier: Box<dyn Classifier>,
}

impl Artifacts {
    pub fn new(
        vectorizer: impl Vectorizer + 'static,
        classifier: impl Classifier + 'static,
    ) -> Self {
        Self {
            vectorizer: Box::new(vectorizer),
            classifier: Box::new(classifier),
        }
    }
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("vectorizer", &self.vectorizer.name())
            .field("features", &self.vectorizer.feature_count())
            .field("classifier", &self.classifier.name())
            .field("classes", &self.classifier.classes())
            .finish()
    }
}

/// Serialized vectorizer, tagged by `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorizerArtifact {
    Tfidf(TfidfVectorizer),
}

impl VectorizerArtifact {
    fn into_vectorizer(self) -> Box<dyn Vectorizer> {
        match self {
            VectorizerArtifact::Tfidf(v) => Box::new(v),
        }
    }
}

/// Serialized classifier, tagged by `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LinearModel),
    LinearSvc(LinearModel),
    MultinomialNb(NaiveBayesClassifier),
}

impl ClassifierArtifact {
    fn into_classifier(self) -> Box<dyn Classifier> {
        match self {
            ClassifierArtifact::LogisticRegression(m) => {
                Box::new(LinearClassifier::logistic_regression(m))
            }
            ClassifierArtifact::LinearSvc(m) => Box::new(LinearClassifier::linear_svc(m)),
            ClassifierArtifact::MultinomialNb(m) => Box::new(m),
        }
    }
}

/// Loader for the two startup artifacts.
pub struct ArtifactLoader<'a> {
    config: &'a ArtifactsConfig,
}

impl<'a> ArtifactLoader<'a> {
    pub fn new(config: &'a ArtifactsConfig) -> Self {
        Self { config }
    }

    /// Load both artifacts. Either failing fails the whole load.
    pub fn load(&self) -> Result<Artifacts, ArtifactError> {
        let classifier = self.load_classifier()?;
        let vectorizer = self.load_vectorizer()?;

        info!(
            vectorizer = %vectorizer.name(),
            features = vectorizer.feature_count(),
            classifier = %classifier.name(),
            classes = ?classifier.classes(),
            "Artifacts loaded successfully"
        );

        Ok(Artifacts {
            vectorizer,
            classifier,
        })
    }

    /// Load the vectorizer artifact
    pub fn load_vectorizer(&self) -> Result<Box<dyn Vectorizer>, ArtifactError> {
        let path = self.config.vectorizer_path();
        info!(path = %path.display(), "Loading vectorizer");
        let artifact: VectorizerArtifact = read_json(&path)?;
        Ok(artifact.into_vectorizer())
    }

    /// Load the classifier artifact
    pub fn load_classifier(&self) -> Result<Box<dyn Classifier>, ArtifactError> {
        let path = self.config.model_path();
        info!(path = %path.display(), "Loading classifier");

        if path.extension().is_some_and(|ext| ext == "onnx") {
            return self.load_onnx(&path);
        }

        let artifact: ClassifierArtifact = read_json(&path)?;
        Ok(artifact.into_classifier())
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
        ensure_exists(path)?;
        let classifier = crate::models::onnx::OnnxClassifier::load(
            path,
            self.config.classes.clone(),
            self.config.onnx_threads,
        )
        .map_err(|e| ArtifactError::Unsupported {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })?;
        Ok(Box::new(classifier))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
        ensure_exists(path)?;
        Err(ArtifactError::Unsupported {
            path: path.to_path_buf(),
            reason: "ONNX classifiers require the `onnx` feature".to_string(),
        })
    }
}

fn ensure_exists(path: &Path) -> Result<(), ArtifactError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ArtifactError::Missing {
            path: path.to_path_buf(),
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    ensure_exists(path)?;
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::FeatureVector;
    use std::path::PathBuf;

    const VECTORIZER_JSON: &str = r#"{
        "kind": "tfidf",
        "vocabulary": {"good": 0, "bad": 1},
        "idf": [1.0, 1.0]
    }"#;

    const CLASSIFIER_JSON: &str = r#"{
        "kind": "logistic_regression",
        "classes": ["negative", "positive"],
        "coef": [[3.0, -3.0]],
        "intercept": [0.0]
    }"#;

    fn artifacts_dir(files: &[(&str, &str)]) -> ArtifactsConfig {
        let dir: PathBuf =
            std::env::temp_dir().join(format!("sentiment-form-loader-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        ArtifactsConfig {
            dir: dir.to_string_lossy().into_owned(),
            ..ArtifactsConfig::default()
        }
    }

    #[test]
    fn test_load_json_artifacts() {
        let config = artifacts_dir(&[
            ("model.json", CLASSIFIER_JSON),
            ("vectorizer.json", VECTORIZER_JSON),
        ]);
        let artifacts = ArtifactLoader::new(&config).load().unwrap();

        assert_eq!(artifacts.vectorizer.feature_count(), 2);
        assert_eq!(artifacts.classifier.name(), "logistic_regression");

        let features = artifacts.vectorizer.transform("good").unwrap();
        assert_eq!(features, FeatureVector::from_dense(&[1.0, 0.0]));
        assert_eq!(artifacts.classifier.predict(&features).unwrap(), "positive");
    }

    #[test]
    fn test_missing_vectorizer() {
        let config = artifacts_dir(&[("model.json", CLASSIFIER_JSON)]);
        let err = ArtifactLoader::new(&config).load().unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Missing { path } if path.ends_with("vectorizer.json")
        ));
    }

    #[test]
    fn test_corrupt_classifier() {
        let config = artifacts_dir(&[
            ("model.json", "\u{80}\u{5}pickle-bytes"),
            ("vectorizer.json", VECTORIZER_JSON),
        ]);
        let err = ArtifactLoader::new(&config).load().unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let config = artifacts_dir(&[
            ("model.json", r#"{"kind": "random_forest", "classes": []}"#),
            ("vectorizer.json", VECTORIZER_JSON),
        ]);
        let err = ArtifactLoader::new(&config).load().unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_requires_feature() {
        let mut config =
            artifacts_dir(&[("model.onnx", "onnx"), ("vectorizer.json", VECTORIZER_JSON)]);
        config.model_file = "model.onnx".to_string();
        let err = ArtifactLoader::new(&config).load().unwrap_err();
        assert!(matches!(err, ArtifactError::Unsupported { .. }));
    }

    #[cfg(feature = "onnx")]
    #[test]
    fn test_corrupt_onnx_is_unsupported() {
        let mut config =
            artifacts_dir(&[("model.onnx", "onnx"), ("vectorizer.json", VECTORIZER_JSON)]);
        config.model_file = "model.onnx".to_string();
        let err = ArtifactLoader::new(&config).load().unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Unsupported { path, .. } if path.ends_with("model.onnx")
        ));
    }

    #[cfg(feature = "onnx")]
    #[test]
    fn test_missing_onnx_is_missing() {
        let mut config = artifacts_dir(&[("vectorizer.json", VECTORIZER_JSON)]);
        config.model_file = "model.onnx".to_string();
        let err = ArtifactLoader::new(&config).load().unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { .. }));
    }
}
