/// Normalize a material description for comparison.
///
/// Keeps only word characters (letters, digits, underscore) and lowercases
/// the result, so punctuation, whitespace and line breaks do not count as
/// differences.
pub fn parse_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Edit-distance based similarity ratio in `[0, 1]`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}
