//! Word-level comparison and placeholder phonetic notation.
//!
//! Notation is a bracketed echo of the input (`[IPA: word]`), not a real
//! phonetic transcription; the comparison signal is orthographic.

use crate::pronunciation::normalize::words;
use crate::pronunciation::similarity::similarity;
use crate::pronunciation::{FullAnalysis, PhoneticDetail};

/// Words scoring above this similarity count as pronounced correctly.
pub const CORRECT_THRESHOLD: f64 = 0.8;

/// Placeholder notation for a word or phrase.
pub fn notation(text: &str) -> String {
    format!("[IPA: {text}]")
}

/// Compares one reference word with the word heard in its place.
pub fn compare_word(reference_word: &str, transcribed_word: &str) -> PhoneticDetail {
    let reference_notation = notation(reference_word);
    let similarity = similarity(
        &reference_word.to_lowercase(),
        &transcribed_word.to_lowercase(),
    );
    let correct = similarity > CORRECT_THRESHOLD;
    let feedback = (!correct)
        .then(|| format!("Try pronouncing '{reference_word}' as /{reference_notation}/"));
    PhoneticDetail {
        word: reference_word.to_string(),
        transcribed: transcribed_word.to_string(),
        transcribed_notation: notation(transcribed_word),
        reference_notation,
        similarity,
        correct,
        feedback,
    }
}

/// Lists the reference words that were not pronounced correctly.
///
/// Words are paired strictly by position. A missing transcribed word is
/// compared as the empty string and extra transcribed words are ignored.
pub fn annotate(reference_text: &str, transcribed_text: &str) -> Vec<PhoneticDetail> {
    let reference = words(reference_text);
    let transcribed = words(transcribed_text);
    reference
        .iter()
        .enumerate()
        .map(|(index, word)| {
            let heard = transcribed.get(index).map(String::as_str).unwrap_or("");
            compare_word(word, heard)
        })
        .filter(|detail| !detail.correct)
        .collect()
}

/// Static guide to stress markers, headed by the text's notation.
pub fn stress_guide(text: &str) -> String {
    let mut guide = format!("IPA: {}\n\n", notation(text));
    guide.push_str("Stress markers:\n");
    guide.push_str("ˈ (primary stress) - emphasize this syllable strongly\n");
    guide.push_str("ˌ (secondary stress) - mild emphasis\n");
    guide
}

/// Notation for the whole text and for each space-separated word.
///
/// Words are split on single spaces only, so repeated spaces produce empty
/// entries.
pub fn full_analysis(text: &str) -> FullAnalysis {
    let words: Vec<String> = text.split(' ').map(str::to_string).collect();
    let word_notations = words.iter().map(|word| notation(word)).collect();
    FullAnalysis {
        text: text.to_string(),
        notation: notation(text),
        words,
        word_notations,
        stress_guide: stress_guide(text),
    }
}
