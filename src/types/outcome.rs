//! Prediction outcome types shown to the user

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-way sentiment outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    /// Neutral or any label other than `positive`/`negative`
    Neutral,
}

impl Sentiment {
    /// Map a raw classifier label by exact, case-sensitive match.
    pub fn from_label(label: &str) -> Self {
        match label {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    /// User-facing message for this outcome
    pub fn message(&self) -> &'static str {
        match self {
            Sentiment::Positive => "😊 Positive Sentiment Detected!",
            Sentiment::Negative => "😠 Negative Sentiment Detected!",
            Sentiment::Neutral => "😐 Neutral Sentiment Detected!",
        }
    }
}

/// Confidence as a percentage in [0, 100], rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Confidence from the maximum of a probability distribution.
    ///
    /// Returns `None` for an empty or non-finite distribution.
    pub fn from_probabilities(probabilities: &[f64]) -> Option<Self> {
        let max = probabilities
            .iter()
            .copied()
            .filter(|p| p.is_finite())
            .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))?;
        let pct = (max * 100.0).clamp(0.0, 100.0);
        Some(Self((pct * 100.0).round() / 100.0))
    }

    /// Percentage value
    pub fn percent(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

/// Result of one successful inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDisplay {
    pub sentiment: Sentiment,
    /// Raw label as returned by the classifier
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl PredictionDisplay {
    pub fn new(label: String, confidence: Option<Confidence>) -> Self {
        Self {
            sentiment: Sentiment::from_label(&label),
            label,
            confidence,
        }
    }
}
