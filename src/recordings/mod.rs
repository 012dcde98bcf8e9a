//! Metadata about graded recordings. Audio itself is never stored.

mod stats;
mod store;

use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pronunciation::grading::MAX_SCORE;
use crate::pronunciation::PhoneticDetail;

pub use stats::{statistics, user_statistics, ScoreDistribution, Statistics, UserStatistics};
pub use store::{JsonFileStore, MemoryStore};

pub const API_VERSION: &str = "rust";
pub const ANONYMOUS_USER: &str = "anonymous";
/// How many of the newest recordings a text search looks through.
pub const SEARCH_WINDOW: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub recording_id: Uuid,
    pub reference_text: String,
    pub transcribed_text: String,
    pub score: u8,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub api_version: String,
    pub has_audio_file: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phonetic_details: Vec<PhoneticDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_guide: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Fields supplied by the caller when a graded attempt is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecording {
    pub reference_text: String,
    pub transcribed_text: String,
    pub score: u8,
    pub user_id: Option<String>,
    pub feedback: Option<String>,
    pub phonetic_details: Vec<PhoneticDetail>,
    pub pronunciation_guide: Option<String>,
    pub grade: Option<String>,
    pub grade_level: Option<String>,
    pub duration: Option<f64>,
    pub file_size: Option<u64>,
    pub file_type: Option<String>,
}

impl NewRecording {
    pub fn new(reference_text: impl Into<String>, transcribed_text: impl Into<String>, score: u8) -> Self {
        Self {
            reference_text: reference_text.into(),
            transcribed_text: transcribed_text.into(),
            score,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Stamps identity and creation time onto the supplied fields.
    pub fn into_metadata(self) -> RecordingMetadata {
        let user_id = self
            .user_id
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty())
            .unwrap_or_else(|| ANONYMOUS_USER.to_string());
        RecordingMetadata {
            recording_id: Uuid::new_v4(),
            reference_text: self.reference_text,
            transcribed_text: self.transcribed_text,
            score: self.score,
            user_id,
            created_at: Utc::now(),
            api_version: API_VERSION.to_string(),
            has_audio_file: false,
            feedback: self.feedback,
            phonetic_details: self.phonetic_details,
            pronunciation_guide: self.pronunciation_guide,
            grade: self.grade,
            grade_level: self.grade_level,
            duration: self.duration,
            file_size: self.file_size,
            file_type: self.file_type,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordingUpdate {
    pub reference_text: Option<String>,
    pub transcribed_text: Option<String>,
    pub score: Option<u8>,
    pub user_id: Option<String>,
    pub feedback: Option<String>,
    pub grade: Option<String>,
    pub grade_level: Option<String>,
}

impl RecordingUpdate {
    /// Applies the present fields; nothing is written if the update is invalid.
    pub fn apply(self, record: &mut RecordingMetadata) -> Result<()> {
        if let Some(score) = self.score {
            ensure!(
                u32::from(score) <= MAX_SCORE,
                "score must be between 0 and {MAX_SCORE}, got {score}"
            );
        }
        if let Some(value) = self.reference_text {
            record.reference_text = value;
        }
        if let Some(value) = self.transcribed_text {
            record.transcribed_text = value;
        }
        if let Some(value) = self.score {
            record.score = value;
        }
        if let Some(value) = self.user_id {
            record.user_id = value;
        }
        if let Some(value) = self.feedback {
            record.feedback = Some(value);
        }
        if let Some(value) = self.grade {
            record.grade = Some(value);
        }
        if let Some(value) = self.grade_level {
            record.grade_level = Some(value);
        }
        Ok(())
    }
}

/// Result of persisting a recording, reported back to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    pub fn saved(recording_id: Uuid) -> Self {
        Self {
            success: true,
            recording_id: Some(recording_id),
            message: Some("Metadata saved".to_string()),
            error: None,
        }
    }

    pub fn failed(error: &anyhow::Error) -> Self {
        Self {
            success: false,
            recording_id: None,
            message: None,
            error: Some(format!("{error:#}")),
        }
    }
}

/// Document store for recording metadata.
///
/// Listings are newest first. Query helpers are built on `list` and can be
/// overridden by stores with native indexes.
pub trait RecordingStore {
    fn save(&self, recording: NewRecording) -> Result<RecordingMetadata>;
    fn get(&self, id: Uuid) -> Result<Option<RecordingMetadata>>;
    fn list(&self, limit: usize) -> Result<Vec<RecordingMetadata>>;
    /// Returns `false` when no recording has this id.
    fn update(&self, id: Uuid, update: RecordingUpdate) -> Result<bool>;
    /// Returns `false` when no recording has this id.
    fn delete(&self, id: Uuid) -> Result<bool>;

    fn list_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<RecordingMetadata>> {
        Ok(self
            .list(usize::MAX)?
            .into_iter()
            .filter(|record| record.user_id == user_id)
            .take(limit)
            .collect())
    }

    /// Recordings scoring within `min..=max`, lowest score first, newest first
    /// among equal scores.
    fn by_score_range(&self, min: u8, max: u8, limit: usize) -> Result<Vec<RecordingMetadata>> {
        let mut matching: Vec<RecordingMetadata> = self
            .list(usize::MAX)?
            .into_iter()
            .filter(|record| (min..=max).contains(&record.score))
            .collect();
        matching.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        matching.truncate(limit);
        Ok(matching)
    }

    /// Case-insensitive substring search over reference, transcript and feedback.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<RecordingMetadata>> {
        let needle = query.to_lowercase();
        Ok(self
            .list(SEARCH_WINDOW)?
            .into_iter()
            .filter(|record| {
                record.reference_text.to_lowercase().contains(&needle)
                    || record.transcribed_text.to_lowercase().contains(&needle)
                    || record
                        .feedback
                        .as_deref()
                        .is_some_and(|feedback| feedback.to_lowercase().contains(&needle))
            })
            .take(limit)
            .collect())
    }
}
