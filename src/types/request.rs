//! Review submission types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of text being analyzed. Recorded with each submission; does not change inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    #[default]
    Product,
    Service,
    General,
}

impl AnalysisType {
    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisType::Product => "Product Review",
            AnalysisType::Service => "Service Review",
            AnalysisType::General => "General Text",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AnalysisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product" | "product review" => Ok(AnalysisType::Product),
            "service" | "service review" => Ok(AnalysisType::Service),
            "general" | "general text" => Ok(AnalysisType::General),
            other => Err(format!(
                "unknown analysis type '{}' (expected product, service or general)",
                other
            )),
        }
    }
}

/// Review text that is non-empty after trimming whitespace.
///
/// Holds the text as entered; trimming only decides acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewText(String);

impl ReviewText {
    pub fn parse(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One press of the predict button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub want_confidence: bool,
    pub analysis_type: AnalysisType,
}

impl Submission {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            want_confidence: false,
            analysis_type: AnalysisType::default(),
        }
    }

    pub fn with_confidence(mut self, want_confidence: bool) -> Self {
        self.want_confidence = want_confidence;
        self
    }

    pub fn with_analysis_type(mut self, analysis_type: AnalysisType) -> Self {
        self.analysis_type = analysis_type;
        self
    }
}
