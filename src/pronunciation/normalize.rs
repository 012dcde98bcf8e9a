/// Punctuation stripped before whole-text comparison. Nothing else is removed.
const STRIPPED_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

/// Canonicalizes text for comparison: lowercase, trimmed, without `. , ! ?`.
///
/// Internal whitespace is left alone, so `"a  b"` and `"a b"` still differ by
/// one character.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .trim()
        .chars()
        .filter(|ch| !STRIPPED_PUNCTUATION.contains(ch))
        .collect()
}

/// Splits text into lowercase word tokens.
///
/// A word is a maximal run of ASCII letters, digits or underscores; every
/// other character acts as a boundary. Text without any such run yields an
/// empty list.
pub fn words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in lowered.chars() {
        if is_word_char(ch) {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
