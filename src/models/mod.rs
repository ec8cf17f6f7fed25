//! Model artifacts and inference components

pub mod classifier;
pub mod inference;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use classifier::{Classifier, LinearClassifier, LinearModel, NaiveBayesClassifier};
pub use inference::{ArtifactState, InferenceService};
pub use loader::{ArtifactLoader, Artifacts};
