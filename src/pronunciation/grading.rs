use crate::pronunciation::{GradeInfo, PronunciationError, Result};

/// Grade bands keyed by inclusive lower bound, highest first.
const GRADE_BANDS: [(u8, GradeInfo); 6] = [
    (95, GradeInfo { grade: "A+", level: "Excellent", color: "#10b981" }),
    (90, GradeInfo { grade: "A", level: "Excellent", color: "#22c55e" }),
    (85, GradeInfo { grade: "B+", level: "Very Good", color: "#84cc16" }),
    (70, GradeInfo { grade: "B", level: "Good", color: "#eab308" }),
    (50, GradeInfo { grade: "C", level: "Fair", color: "#f97316" }),
    (0, GradeInfo { grade: "F", level: "Poor", color: "#ef4444" }),
];

const FEEDBACK_TIERS: [(u8, &str); 5] = [
    (95, "Excellent! Your pronunciation is nearly perfect."),
    (85, "Great job! Your pronunciation is very clear with minor differences."),
    (70, "Good effort! There are some pronunciation differences. Keep practicing."),
    (50, "Fair attempt. Focus on clarity and try to match the reference text more closely."),
    (0, "Keep practicing! Try speaking more slowly and clearly."),
];

pub const MAX_SCORE: u32 = 100;

/// Maps a 0-100 score to its grade band.
pub fn classify(score: u32) -> Result<GradeInfo> {
    let score = checked_score(score)?;
    Ok(GRADE_BANDS
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, info)| *info)
        .unwrap_or(GRADE_BANDS[GRADE_BANDS.len() - 1].1))
}

/// Fixed feedback sentence for a score. Scores above 100 share the top tier.
pub fn feedback_for(score: u8) -> &'static str {
    FEEDBACK_TIERS
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, text)| *text)
        .unwrap_or(FEEDBACK_TIERS[FEEDBACK_TIERS.len() - 1].1)
}

fn checked_score(score: u32) -> Result<u8> {
    if score > MAX_SCORE {
        return Err(PronunciationError::invalid(format!(
            "score must be between 0 and {MAX_SCORE}, got {score}"
        )));
    }
    Ok(score as u8)
}
