//! Text normalization helpers shared by the classifier and deduplicator.

/// Normalize free text for keyword matching.
///
/// Lower-cases, turns every non-alphanumeric character into a word break
/// and collapses whitespace, so `"soccer_epl"` and `"Soccer - EPL"` both
/// become `"soccer epl"`.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a participant name for dedup keys: trimmed and lower-cased only.
pub fn normalize_participant(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Check if normalized text contains phrase as whole words
/// (not a substring of another word).
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let text_words: Vec<&str> = text.split_whitespace().collect();
    let phrase_words: Vec<&str> = phrase.split_whitespace().collect();

    if phrase_words.is_empty() {
        return false;
    }

    if phrase_words.len() > 1 {
        return text_words
            .windows(phrase_words.len())
            .any(|window| window == phrase_words.as_slice());
    }

    text_words.contains(&phrase_words[0])
}
