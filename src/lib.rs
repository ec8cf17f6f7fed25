//! Sentiment Analysis Form Library
//!
//! Loads a pre-trained text vectorizer and classifier once at startup and
//! turns review text into a positive / negative / neutral notice, with an
//! optional confidence score.

pub mod config;
pub mod error;
pub mod form;
pub mod metrics;
pub mod models;
pub mod types;
pub mod vectorizer;

pub use config::AppConfig;
pub use error::{ArtifactError, InferenceError};
pub use form::{Form, FormResponse, Notice};
pub use models::inference::InferenceService;
pub use types::{AnalysisType, PredictionDisplay, Sentiment, Submission};
pub use vectorizer::{FeatureVector, Vectorizer};
