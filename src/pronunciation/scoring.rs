use crate::pronunciation::grading::{classify, feedback_for};
use crate::pronunciation::normalize::normalize;
use crate::pronunciation::phonetics::{annotate, full_analysis, stress_guide};
use crate::pronunciation::similarity::similarity;
use crate::pronunciation::{
    FullAnalysis, GradeInfo, PronunciationError, Result, ScoreResult,
};

/// Composes normalization, similarity, annotation and grading into one result.
///
/// Stateless; a single instance can be shared across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores a transcript against the reference text it was meant to read.
    pub fn score(&self, reference_text: &str, transcribed_text: &str) -> Result<ScoreResult> {
        let reference = normalize(reference_text);
        let transcribed = normalize(transcribed_text);
        ensure_comparable(&reference, &transcribed)?;

        let score = to_score(similarity(&reference, &transcribed));
        Ok(ScoreResult {
            score,
            feedback: feedback_for(score).to_string(),
            phonetic_details: annotate(reference_text, transcribed_text),
            pronunciation_guide: stress_guide(reference_text),
        })
    }

    /// Grade band for a previously computed score.
    pub fn classify(&self, score: u32) -> Result<GradeInfo> {
        classify(score)
    }

    pub fn full_analysis(&self, text: &str) -> FullAnalysis {
        full_analysis(text)
    }
}

fn ensure_comparable(reference: &str, transcribed: &str) -> Result<()> {
    if reference.is_empty() && transcribed.is_empty() {
        return Err(PronunciationError::DegenerateComparison);
    }
    Ok(())
}

fn to_score(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}
