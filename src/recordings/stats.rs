use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;

use super::{RecordingMetadata, RecordingStore, API_VERSION};

const STATISTICS_WINDOW: usize = 1000;
const TREND_MIN_RECORDINGS: usize = 10;
const TREND_SPAN: usize = 5;
const RECENT_COUNT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

impl ScoreDistribution {
    fn record(&mut self, score: u8) {
        match score {
            90.. => self.excellent += 1,
            70..=89 => self.good += 1,
            50..=69 => self.fair += 1,
            _ => self.poor += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_recordings: usize,
    pub average_score: f64,
    pub total_users: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_distribution: Option<ScoreDistribution>,
    pub api_version: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatistics {
    pub total_recordings: usize,
    pub average_score: f64,
    pub best_score: u8,
    pub worst_score: u8,
    /// Newest five minus oldest five average; needs ten recordings.
    pub improvement_trend: Option<f64>,
    pub recent_recordings: Vec<RecordingMetadata>,
}

/// Aggregate figures over the newest recordings in the store.
pub fn statistics(store: &dyn RecordingStore) -> Result<Statistics> {
    let recordings = store.list(STATISTICS_WINDOW)?;
    if recordings.is_empty() {
        return Ok(Statistics {
            total_recordings: 0,
            average_score: 0.0,
            total_users: 0,
            score_distribution: None,
            api_version: API_VERSION,
        });
    }

    let scores: Vec<u8> = recordings.iter().map(|r| r.score).collect();
    let users: HashSet<&str> = recordings.iter().map(|r| r.user_id.as_str()).collect();
    let mut distribution = ScoreDistribution::default();
    for &score in &scores {
        distribution.record(score);
    }

    Ok(Statistics {
        total_recordings: recordings.len(),
        average_score: round2(mean(&scores)),
        total_users: users.len(),
        score_distribution: Some(distribution),
        api_version: API_VERSION,
    })
}

/// Progress summary for a single learner.
pub fn user_statistics(store: &dyn RecordingStore, user_id: &str) -> Result<UserStatistics> {
    let recordings = store.list_by_user(user_id, STATISTICS_WINDOW)?;
    if recordings.is_empty() {
        return Ok(UserStatistics {
            total_recordings: 0,
            average_score: 0.0,
            best_score: 0,
            worst_score: 0,
            improvement_trend: None,
            recent_recordings: Vec::new(),
        });
    }

    // Newest first, so the head is recent and the tail is old.
    let scores: Vec<u8> = recordings.iter().map(|r| r.score).collect();
    let improvement_trend = (scores.len() >= TREND_MIN_RECORDINGS).then(|| {
        let recent = mean(&scores[..TREND_SPAN]);
        let old = mean(&scores[scores.len() - TREND_SPAN..]);
        round2(recent - old)
    });

    Ok(UserStatistics {
        total_recordings: recordings.len(),
        average_score: round2(mean(&scores)),
        best_score: scores.iter().copied().max().unwrap_or(0),
        worst_score: scores.iter().copied().min().unwrap_or(0),
        improvement_trend,
        recent_recordings: recordings.into_iter().take(RECENT_COUNT).collect(),
    })
}

fn mean(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
