//! The review form: input guard and user-facing notices.
//!
//! This is the only layer that decides what the user sees. Empty input is
//! answered here and never reaches the inference service; every inference
//! error collapses into one generic notice.

use crate::models::InferenceService;
use crate::types::{AnalysisType, PredictionDisplay, ReviewText, Sentiment, Submission};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

pub const TITLE: &str = "Sentiment Analysis";
pub const SUBTITLE: &str = "Professional Golden NLP Analyzer";
pub const FOOTER: &str = "© 2026 Sentiment Analysis NLP Project | HexaSoftware Internship";
pub const CREDIT: &str = "Developed by Mahnoor Khan 💛";

const ENTER_TEXT: &str = "⚠️ Please enter review text.";
const MODEL_FILES_NEEDED: &str = "UI looks premium! (Model files needed for actual prediction)";
const CELEBRATION: &str = "🎈 🎈 🎈";

/// What the form shows after a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    Prediction(PredictionDisplay),
    /// Input was empty or whitespace-only
    EnterText,
    /// Inference failed for any reason
    ModelFilesNeeded,
}

impl Notice {
    /// Stable name for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Prediction(p) => match p.sentiment {
                Sentiment::Positive => "positive",
                Sentiment::Negative => "negative",
                Sentiment::Neutral => "neutral",
            },
            Notice::EnterText => "empty_input",
            Notice::ModelFilesNeeded => "model_unavailable",
        }
    }

    /// Lines to display, in order
    pub fn lines(&self) -> Vec<String> {
        match self {
            Notice::Prediction(p) => {
                let mut lines = vec![p.sentiment.message().to_string()];
                if p.sentiment == Sentiment::Positive {
                    lines.push(CELEBRATION.to_string());
                }
                if let Some(confidence) = p.confidence {
                    lines.push(format!("📊 Confidence Score: {}", confidence));
                }
                lines
            }
            Notice::EnterText => vec![ENTER_TEXT.to_string()],
            Notice::ModelFilesNeeded => vec![MODEL_FILES_NEEDED.to_string()],
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// A notice with submission metadata
#[derive(Debug, Clone, Serialize)]
pub struct FormResponse {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub analysis_type: AnalysisType,
    #[serde(flatten)]
    pub notice: Notice,
}

/// The form over an inference service
#[derive(Debug)]
pub struct Form {
    service: InferenceService,
}

impl Form {
    pub fn new(service: InferenceService) -> Self {
        Self { service }
    }

    /// Handle one press of the predict button.
    pub fn submit(&self, submission: &Submission) -> FormResponse {
        let id = Uuid::new_v4();
        let notice = self.notice_for(submission);

        info!(
            submission_id = %id,
            analysis_type = %submission.analysis_type,
            want_confidence = submission.want_confidence,
            notice = notice.kind(),
            "Submission handled"
        );

        FormResponse {
            id,
            submitted_at: Utc::now(),
            analysis_type: submission.analysis_type,
            notice,
        }
    }

    fn notice_for(&self, submission: &Submission) -> Notice {
        let Some(text) = ReviewText::parse(&submission.text) else {
            return Notice::EnterText;
        };

        match self.service.predict(text.as_str(), submission.want_confidence) {
            Ok(display) => Notice::Prediction(display),
            Err(e) => {
                debug!(error = %e, "Inference failed");
                Notice::ModelFilesNeeded
            }
        }
    }
}

/// Title block shown when the form opens or is cleared
pub fn header() -> String {
    format!("{TITLE}\n{SUBTITLE}")
}
