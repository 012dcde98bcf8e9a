//! Speech-to-text and text-to-speech collaborators.
//!
//! The scoring engine never talks to a speech provider directly; the service
//! layer is handed implementations of these traits.

mod voices;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

pub use voices::{find_voice, Voice, DEFAULT_VOICE, VOICES};

pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 4.0;
pub const DEFAULT_SPEED: f32 = 1.0;
/// Playback speed used for learner-paced reference audio.
pub const SLOW_SPEED: f32 = 0.75;

/// Text recognized in a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub language: String,
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// A timed piece of a transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64, // seconds
    pub end: f64,   // seconds
}

pub trait SpeechToText {
    fn transcribe(&self, audio: &[u8], language: &str) -> Result<Transcription>;
}

pub trait TextToSpeech {
    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>>;
}

/// Validated synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: &'static Voice,
    pub speed: f32,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice: &str, speed: f32) -> Result<Self> {
        let text = text.into();
        ensure!(!text.trim().is_empty(), "Text to synthesize must not be empty");
        ensure!(
            (MIN_SPEED..=MAX_SPEED).contains(&speed),
            "Speed must be between {MIN_SPEED:.2} and {MAX_SPEED:.1}"
        );
        let voice = find_voice(voice)?;
        Ok(Self { text, voice, speed })
    }

    pub fn slow(text: impl Into<String>, voice: &str) -> Result<Self> {
        Self::new(text, voice, SLOW_SPEED)
    }
}

/// Offline transcriber that reports an operator-supplied transcript.
///
/// Useful when the recording was already transcribed elsewhere; the audio
/// bytes are ignored.
#[derive(Debug, Clone)]
pub struct ProvidedTranscript {
    text: String,
    duration_secs: Option<f64>,
}

impl ProvidedTranscript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration_secs: None,
        }
    }

    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }
}

impl SpeechToText for ProvidedTranscript {
    fn transcribe(&self, _audio: &[u8], language: &str) -> Result<Transcription> {
        Ok(Transcription {
            text: self.text.clone(),
            language: language.to_string(),
            duration_secs: self.duration_secs,
            segments: Vec::new(),
        })
    }
}

/// Synthesizer for deployments without a speech provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSynthesis;

impl TextToSpeech for NoSynthesis {
    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        anyhow::bail!(
            "no text-to-speech provider configured (voice {}, {} chars)",
            request.voice.id,
            request.text.chars().count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_bounds_are_inclusive() {
        assert!(SpeechRequest::new("hi", "alloy", 0.25).is_ok());
        assert!(SpeechRequest::new("hi", "alloy", 4.0).is_ok());
        let err = SpeechRequest::new("hi", "alloy", 4.5).unwrap_err();
        assert_eq!(err.to_string(), "Speed must be between 0.25 and 4.0");
        assert!(SpeechRequest::new("hi", "alloy", 0.2).is_err());
    }

    #[test]
    fn slow_request_uses_three_quarter_speed() {
        let request = SpeechRequest::slow("Peter Piper", "nova").unwrap();
        assert_eq!(request.speed, SLOW_SPEED);
        assert_eq!(request.voice.name, "Nova");
    }

    #[test]
    fn rejects_blank_text_and_unknown_voice() {
        assert!(SpeechRequest::new("   ", "alloy", 1.0).is_err());
        assert!(SpeechRequest::new("hi", "robot", 1.0).is_err());
    }

    #[test]
    fn provided_transcript_echoes_language() {
        let stt = ProvidedTranscript::new("hello").with_duration(1.5);
        let result = stt.transcribe(&[], "fr").unwrap();
        assert_eq!(result.text, "hello");
        assert_eq!(result.language, "fr");
        assert_eq!(result.duration_secs, Some(1.5));
    }

    #[test]
    fn no_synthesis_reports_missing_provider() {
        let request = SpeechRequest::new("hi", "echo", 1.0).unwrap();
        assert!(NoSynthesis.synthesize(&request).is_err());
    }
}
