use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use pronunciation_trainer::config::AppConfig;
use pronunciation_trainer::recordings::{
    MemoryStore, NewRecording, RecordingMetadata, RecordingStore, RecordingUpdate,
};
use pronunciation_trainer::service::{AnalyzeRequest, PronunciationService};
use pronunciation_trainer::speech::{
    ProvidedTranscript, SpeechRequest, SpeechToText, TextToSpeech, Transcription,
};
use tempfile::TempDir;
use uuid::Uuid;

const SAMPLE_RATE: u32 = 16_000;

/// Records every synthesis request and returns a fixed payload.
#[derive(Default)]
struct RecordingSynth {
    requests: RefCell<Vec<(String, String, f32)>>,
}

impl TextToSpeech for &RecordingSynth {
    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push((
            request.text.clone(),
            request.voice.id.to_string(),
            request.speed,
        ));
        Ok(b"ID3-fake-mp3".to_vec())
    }
}

struct FailingTranscriber;

impl SpeechToText for FailingTranscriber {
    fn transcribe(&self, _audio: &[u8], _language: &str) -> Result<Transcription> {
        bail!("provider unavailable")
    }
}

struct BrokenStore;

impl RecordingStore for BrokenStore {
    fn save(&self, _recording: NewRecording) -> Result<RecordingMetadata> {
        bail!("disk full")
    }
    fn get(&self, _id: Uuid) -> Result<Option<RecordingMetadata>> {
        Ok(None)
    }
    fn list(&self, _limit: usize) -> Result<Vec<RecordingMetadata>> {
        Ok(Vec::new())
    }
    fn update(&self, _id: Uuid, _update: RecordingUpdate) -> Result<bool> {
        Ok(false)
    }
    fn delete(&self, _id: Uuid) -> Result<bool> {
        Ok(false)
    }
}

fn write_wav(dir: &TempDir, name: &str, seconds: f32) -> PathBuf {
    let path = dir.path().join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    let total = (SAMPLE_RATE as f32 * seconds) as usize;
    for i in 0..total {
        let t = i as f32 / SAMPLE_RATE as f32;
        writer
            .write_sample(((t * 2.0 * std::f32::consts::PI * 220.0).sin() * 6000.0) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn service<S: SpeechToText, R: RecordingStore>(
    transcriber: S,
    store: R,
) -> PronunciationService<S, &'static RecordingSynth, R> {
    let synth: &'static RecordingSynth = Box::leak(Box::new(RecordingSynth::default()));
    PronunciationService::new(transcriber, synth, store, AppConfig::default())
}

#[test]
fn analyze_scores_saves_and_removes_upload() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(&dir, "attempt.wav", 1.0);
    let svc = service(ProvidedTranscript::new("the dog sat"), MemoryStore::new());

    let mut request = AnalyzeRequest::new(&audio, "The cat sat");
    request.user_id = Some("learner-1".to_string());
    let result = svc.analyze(&request).unwrap();

    assert_eq!(result.score, 73);
    assert_eq!(result.grade.grade, "B");
    assert_eq!(result.phonetic_details.len(), 1);
    assert_eq!(result.duration, Some(1.0));
    assert!(result.note.is_some());
    assert!(!audio.exists(), "upload should be deleted");

    let outcome = result.database_save.unwrap();
    assert!(outcome.success);
    let saved = svc.store().get(outcome.recording_id.unwrap()).unwrap().unwrap();
    assert_eq!(saved.user_id, "learner-1");
    assert_eq!(saved.grade.as_deref(), Some("B"));
    assert_eq!(saved.grade_level.as_deref(), Some("Good"));
    assert_eq!(saved.file_type.as_deref(), Some("wav"));
    assert!(saved.file_size.unwrap() > 0);
    assert_eq!(saved.phonetic_details.len(), 1);
}

#[test]
fn provider_duration_wins_over_probe() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(&dir, "attempt.wav", 0.5);
    let svc = service(
        ProvidedTranscript::new("hello").with_duration(2.25),
        MemoryStore::new(),
    );
    let mut request = AnalyzeRequest::new(&audio, "hello");
    request.save = false;
    let result = svc.analyze(&request).unwrap();

    assert_eq!(result.duration, Some(2.25));
    assert!(result.database_save.is_none());
    assert!(result.note.is_none());
    assert!(svc.store().list(10).unwrap().is_empty());
}

#[test]
fn undecodable_upload_still_scores() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("attempt.webm");
    std::fs::write(&audio, b"\x1a\x45\xdf\xa3 browser opus bytes").unwrap();
    let svc = service(
        ProvidedTranscript::new("hello world").with_duration(1.0),
        MemoryStore::new(),
    );

    let result = svc.analyze(&AnalyzeRequest::new(&audio, "Hello world")).unwrap();
    assert_eq!(result.score, 100);
    assert_eq!(result.duration, Some(1.0));

    let id = result.database_save.unwrap().recording_id.unwrap();
    let saved = svc.store().get(id).unwrap().unwrap();
    assert_eq!(saved.file_type.as_deref(), Some("webm"));
    assert_eq!(saved.file_size, Some(23));
    assert!(!audio.exists());
}

#[test]
fn unknown_duration_when_provider_and_decoder_both_lack_it() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("attempt.webm");
    std::fs::write(&audio, b"not decodable").unwrap();
    let svc = service(ProvidedTranscript::new("hello"), MemoryStore::new());

    let result = svc.analyze(&AnalyzeRequest::new(&audio, "hello")).unwrap();
    assert_eq!(result.score, 100);
    assert_eq!(result.duration, None);
}

#[test]
fn upload_is_removed_even_when_transcription_fails() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(&dir, "attempt.wav", 0.2);
    let svc = service(FailingTranscriber, MemoryStore::new());

    let err = svc
        .analyze(&AnalyzeRequest::new(&audio, "hello"))
        .unwrap_err();
    assert!(format!("{err:#}").contains("provider unavailable"));
    assert!(!audio.exists());
}

#[test]
fn blank_reference_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(&dir, "attempt.wav", 0.2);
    let svc = service(ProvidedTranscript::new("hello"), MemoryStore::new());

    let mut request = AnalyzeRequest::new(&audio, "   ");
    request.remove_audio = false;
    let err = svc.analyze(&request).unwrap_err();
    assert_eq!(err.to_string(), "Reference text is required");
    assert!(audio.exists(), "caller asked to keep the file");
}

#[test]
fn oversized_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(&dir, "attempt.wav", 0.5);
    let config = AppConfig {
        max_upload_bytes: 128,
        ..AppConfig::default()
    };
    let synth: &'static RecordingSynth = Box::leak(Box::new(RecordingSynth::default()));
    let svc = PronunciationService::new(
        ProvidedTranscript::new("hello"),
        synth,
        MemoryStore::new(),
        config,
    );

    let err = svc
        .analyze(&AnalyzeRequest::new(&audio, "hello"))
        .unwrap_err();
    assert!(err.to_string().contains("byte limit"));
}

#[test]
fn store_failure_is_reported_in_response() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(&dir, "attempt.wav", 0.2);
    let svc = service(ProvidedTranscript::new("hello"), BrokenStore);

    let result = svc.analyze(&AnalyzeRequest::new(&audio, "hello")).unwrap();
    let outcome = result.database_save.unwrap();
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("disk full"));
    assert!(result.note.is_none());
    assert_eq!(result.score, 100);
}

#[test]
fn transcribe_uses_default_language_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let audio = write_wav(&dir, "clip.wav", 0.2);
    let svc = service(ProvidedTranscript::new("bonjour"), MemoryStore::new());

    let result = svc.transcribe(&audio, None).unwrap();
    assert_eq!(result.language, "en");
    assert_eq!(result.text, "bonjour");
    assert!(!audio.exists());

    let missing = Path::new("/no/such/clip.wav");
    assert!(svc.transcribe(missing, Some("fr")).is_err());
}

#[test]
fn grade_merges_score_and_band() {
    let svc = service(ProvidedTranscript::new(""), MemoryStore::new());
    let response = svc.grade("Hello, how are you?", "hello how are you").unwrap();
    assert_eq!(response.score, 100);
    assert_eq!(response.grade.grade, "A+");
    assert!(svc.grade("", "").is_err());
}

#[test]
fn speech_requests_are_validated_and_defaulted() {
    let synth: &'static RecordingSynth = Box::leak(Box::new(RecordingSynth::default()));
    let svc = PronunciationService::new(
        ProvidedTranscript::new(""),
        synth,
        MemoryStore::new(),
        AppConfig::default(),
    );

    assert_eq!(svc.speak("Good morning", None, None).unwrap(), b"ID3-fake-mp3");
    svc.speak_slow("Good morning", Some("onyx")).unwrap();
    assert!(svc.speak("Good morning", None, Some(5.0)).is_err());
    assert!(svc.speak("Good morning", Some("robot"), None).is_err());

    let requests = synth.requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], ("Good morning".to_string(), "alloy".to_string(), 1.0));
    assert_eq!(requests[1].1, "onyx");
    assert_eq!(requests[1].2, 0.75);
}

#[test]
fn ipa_analysis_passes_through() {
    let svc = service(ProvidedTranscript::new(""), MemoryStore::new());
    let analysis = svc.ipa("sea shells");
    assert_eq!(analysis.words, ["sea", "shells"]);
}
