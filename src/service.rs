//! Boundary flows around the scoring engine: transcribe, grade, persist.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::audio::{probe_file, upload_info};
use crate::config::AppConfig;
use crate::pronunciation::{FullAnalysis, GradeInfo, PhoneticDetail, ScoringEngine};
use crate::recordings::{NewRecording, RecordingStore, SaveOutcome};
use crate::speech::{SpeechRequest, SpeechToText, TextToSpeech, Transcription, DEFAULT_SPEED};

const METADATA_ONLY_NOTE: &str =
    "Audio file processed temporarily - only metadata saved to database";

/// An uploaded recording to grade against its reference text.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub audio_path: PathBuf,
    pub reference_text: String,
    pub user_id: Option<String>,
    pub save: bool,
    /// Delete the audio file once processed.
    pub remove_audio: bool,
}

impl AnalyzeRequest {
    pub fn new(audio_path: impl Into<PathBuf>, reference_text: impl Into<String>) -> Self {
        Self {
            audio_path: audio_path.into(),
            reference_text: reference_text.into(),
            user_id: None,
            save: true,
            remove_audio: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub transcribed_text: String,
    pub reference_text: String,
    pub score: u8,
    pub feedback: String,
    pub grade: GradeInfo,
    pub phonetic_details: Vec<PhoneticDetail>,
    pub pronunciation_guide: String,
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_save: Option<SaveOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// Score plus grade band for a transcript that is already known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeResponse {
    pub score: u8,
    pub feedback: String,
    pub grade: GradeInfo,
    pub phonetic_details: Vec<PhoneticDetail>,
    pub pronunciation_guide: String,
}

pub struct PronunciationService<S, T, R> {
    engine: ScoringEngine,
    transcriber: S,
    synthesizer: T,
    store: R,
    config: AppConfig,
}

impl<S, T, R> PronunciationService<S, T, R>
where
    S: SpeechToText,
    T: TextToSpeech,
    R: RecordingStore,
{
    pub fn new(transcriber: S, synthesizer: T, store: R, config: AppConfig) -> Self {
        Self {
            engine: ScoringEngine::new(),
            transcriber,
            synthesizer,
            store,
            config,
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Transcribes an uploaded file; the file is removed afterwards.
    pub fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcription> {
        let language = language.unwrap_or(&self.config.default_language);
        let result = self.read_upload(audio_path).and_then(|audio| {
            self.transcriber
                .transcribe(&audio, language)
                .context("Transcription failed")
        });
        remove_upload(audio_path);
        result
    }

    /// Transcribes, scores and grades a recording, optionally saving its metadata.
    ///
    /// The audio file is removed on success and on failure when
    /// `remove_audio` is set.
    pub fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult> {
        let result = self.analyze_inner(request);
        if request.remove_audio {
            remove_upload(&request.audio_path);
        }
        result
    }

    fn analyze_inner(&self, request: &AnalyzeRequest) -> Result<AnalysisResult> {
        ensure!(
            !request.reference_text.trim().is_empty(),
            "Reference text is required"
        );
        let audio = self.read_upload(&request.audio_path)?;
        let upload = upload_info(&request.audio_path)?;

        let transcription = self
            .transcriber
            .transcribe(&audio, &self.config.default_language)
            .context("Transcription failed")?;
        let transcribed_text = transcription.text;
        let duration = transcription
            .duration_secs
            .or_else(|| probed_duration(&request.audio_path));

        let scored = self
            .engine
            .score(&request.reference_text, &transcribed_text)
            .context("Scoring failed")?;
        let grade = self.engine.classify(u32::from(scored.score))?;
        info!(
            score = scored.score,
            grade = grade.grade,
            mismatched_words = scored.phonetic_details.len(),
            "recording analyzed"
        );

        let database_save = request.save.then(|| {
            self.save_recording(NewRecording {
                reference_text: request.reference_text.clone(),
                transcribed_text: transcribed_text.clone(),
                score: scored.score,
                user_id: request.user_id.clone(),
                feedback: Some(scored.feedback.clone()),
                phonetic_details: scored.phonetic_details.clone(),
                pronunciation_guide: Some(scored.pronunciation_guide.clone()),
                grade: Some(grade.grade.to_string()),
                grade_level: Some(grade.level.to_string()),
                duration,
                file_size: Some(upload.file_size),
                file_type: Some(upload.file_type.clone()),
            })
        });
        let note = database_save
            .as_ref()
            .filter(|outcome| outcome.success)
            .map(|_| METADATA_ONLY_NOTE);

        Ok(AnalysisResult {
            transcribed_text,
            reference_text: request.reference_text.clone(),
            score: scored.score,
            feedback: scored.feedback,
            grade,
            phonetic_details: scored.phonetic_details,
            pronunciation_guide: scored.pronunciation_guide,
            duration,
            database_save,
            note,
        })
    }

    /// Grades a transcript without audio.
    pub fn grade(&self, reference_text: &str, transcribed_text: &str) -> Result<GradeResponse> {
        let scored = self.engine.score(reference_text, transcribed_text)?;
        let grade = self.engine.classify(u32::from(scored.score))?;
        Ok(GradeResponse {
            score: scored.score,
            feedback: scored.feedback,
            grade,
            phonetic_details: scored.phonetic_details,
            pronunciation_guide: scored.pronunciation_guide,
        })
    }

    pub fn ipa(&self, text: &str) -> FullAnalysis {
        self.engine.full_analysis(text)
    }

    pub fn speak(&self, text: &str, voice: Option<&str>, speed: Option<f32>) -> Result<Vec<u8>> {
        let request = SpeechRequest::new(
            text,
            voice.unwrap_or(&self.config.default_voice),
            speed.unwrap_or(DEFAULT_SPEED),
        )?;
        self.synthesize(&request)
    }

    pub fn speak_slow(&self, text: &str, voice: Option<&str>) -> Result<Vec<u8>> {
        let request = SpeechRequest::slow(text, voice.unwrap_or(&self.config.default_voice))?;
        self.synthesize(&request)
    }

    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let audio = self
            .synthesizer
            .synthesize(request)
            .context("TTS generation failed")?;
        info!(
            voice = request.voice.id,
            speed = request.speed,
            bytes = audio.len(),
            "speech generated"
        );
        Ok(audio)
    }

    fn read_upload(&self, path: &Path) -> Result<Vec<u8>> {
        let size = fs::metadata(path)
            .with_context(|| format!("No audio file at {}", path.display()))?
            .len();
        if size > self.config.max_upload_bytes {
            bail!(
                "Audio file is {size} bytes, above the {} byte limit",
                self.config.max_upload_bytes
            );
        }
        fs::read(path).with_context(|| format!("Failed to read audio file {}", path.display()))
    }

    fn save_recording(&self, recording: NewRecording) -> SaveOutcome {
        match self.store.save(recording) {
            Ok(saved) => {
                info!(recording_id = %saved.recording_id, "metadata saved");
                SaveOutcome::saved(saved.recording_id)
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed to save recording metadata");
                SaveOutcome::failed(&err)
            }
        }
    }
}

/// Duration from decoding the upload; formats symphonia cannot read yield `None`.
fn probed_duration(path: &Path) -> Option<f64> {
    probe_file(path)
        .map(|probed| probed.duration_secs)
        .map_err(|err| {
            warn!(
                path = %path.display(),
                error = %format!("{err:#}"),
                "could not probe audio duration"
            );
        })
        .ok()
}

fn remove_upload(path: &Path) {
    if path.exists() {
        if let Err(err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %err, "failed to delete temp audio file");
        }
    }
}
