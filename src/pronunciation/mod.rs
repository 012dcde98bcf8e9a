pub mod grading;
pub mod normalize;
pub mod phonetics;
pub mod scoring;
pub mod similarity;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grading::{classify, feedback_for};
pub use phonetics::{annotate, full_analysis, notation, stress_guide};
pub use scoring::ScoringEngine;
pub use similarity::similarity;

/// Convenient alias for results returned by pronunciation modules.
pub type Result<T> = std::result::Result<T, PronunciationError>;

/// Failures surfaced by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PronunciationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("nothing to compare: reference and transcribed text are both empty")]
    DegenerateComparison,
}

impl PronunciationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Outcome of comparing a transcript against its reference text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub feedback: String,
    pub phonetic_details: Vec<PhoneticDetail>,
    pub pronunciation_guide: String,
}

/// One reference word compared with the transcribed word at the same position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneticDetail {
    pub word: String,
    pub transcribed: String,
    #[serde(rename = "reference_ipa")]
    pub reference_notation: String,
    #[serde(rename = "transcribed_ipa")]
    pub transcribed_notation: String,
    pub similarity: f64,
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Letter grade, qualitative level and display color for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeInfo {
    pub grade: &'static str,
    pub level: &'static str,
    pub color: &'static str,
}

/// Word-by-word placeholder notation for arbitrary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullAnalysis {
    pub text: String,
    #[serde(rename = "ipa")]
    pub notation: String,
    pub words: Vec<String>,
    #[serde(rename = "word_ipa")]
    pub word_notations: Vec<String>,
    pub stress_guide: String,
}
