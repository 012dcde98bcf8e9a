/// Character-level closeness of two strings in `[0, 1]`.
///
/// Computed as `1 - levenshtein(a, b) / max(len(a), len(b))` where lengths are
/// counted in chars. Two empty strings are a trivial perfect match and score
/// `1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
}
