//! ONNX classifier backend
//!
//! Expects a model exported without a zipmap: a single float input of shape
//! `[1, num_features]` and a probability tensor of shape `[1, num_classes]`.

use crate::models::classifier::{argmax, Classifier};
use crate::vectorizer::FeatureVector;
use anyhow::{anyhow, bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Classifier backed by an ONNX Runtime session
pub struct OnnxClassifier {
    /// Session `run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    classes: Vec<String>,
}

impl OnnxClassifier {
    /// Load an ONNX model; `classes` gives the label order of its probability output.
    pub fn load(path: &Path, classes: Vec<String>, threads: usize) -> Result<Self> {
        ort::init().commit()?;

        info!(path = %path.display(), threads = threads, "Loading ONNX classifier");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(input = %input_name, output = %output_name, "ONNX classifier loaded");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            classes,
        })
    }

    fn run(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let shape = vec![1_i64, features.dim() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_dense()))
            .context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_tensor])?;

        let output = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("model has no output named {}", self.output_name))?;
        let (_shape, data) = output.try_extract_tensor::<f32>()?;

        let probabilities: Vec<f64> = data.iter().map(|&p| p as f64).collect();
        if probabilities.len() != self.classes.len() {
            bail!(
                "model produced {} probabilities for {} configured classes",
                probabilities.len(),
                self.classes.len()
            );
        }
        debug!(probabilities = ?probabilities, "ONNX inference complete");
        Ok(probabilities)
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let probabilities = self.run(features)?;
        let idx = argmax(&probabilities).context("model has no classes")?;
        Ok(self.classes[idx].clone())
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        self.run(features)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_model(bytes: &[u8]) -> std::path::PathBuf {
        let path =
            std::env::temp_dir().join(format!("sentiment-form-onnx-{}.onnx", uuid::Uuid::new_v4()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_load_rejects_non_onnx_bytes() {
        let path = write_model(b"\x80\x05not a protobuf graph");
        let classes = vec!["negative".to_string(), "positive".to_string()];
        let err = OnnxClassifier::load(&path, classes, 1).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load model"));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("sentiment-form-onnx-absent.onnx");
        assert!(OnnxClassifier::load(&path, Vec::new(), 1).is_err());
    }
}
