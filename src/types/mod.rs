//! Type definitions for the sentiment form

pub mod outcome;
pub mod request;

pub use outcome::{Confidence, PredictionDisplay, Sentiment};
pub use request::{AnalysisType, ReviewText, Submission};
