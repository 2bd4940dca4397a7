//! Text and URL feature extraction.
//!
//! Tokens are lowercased, stripped of everything except word characters,
//! hyphens and whitespace, split on whitespace/hyphens, and filtered by
//! length and a fixed stop-word list. Host labels skip the stop-word pass.

use std::collections::HashSet;

const MIN_TOKEN_LEN: usize = 3;
const FINGERPRINT_DELIMITER: &str = "|";

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "his", "how", "its", "may", "new", "now", "old", "see", "two",
    "who", "did", "get", "let", "say", "she", "too", "use", "with", "this", "that", "from",
    "they", "will", "have", "been", "were", "what", "when", "your", "which", "their", "there",
    "about", "would", "these", "other", "into", "more", "some", "than", "then", "them", "only",
    "also", "just", "over", "such", "here", "very", "www", "http", "https", "html", "htm",
    "php", "index",
];

/// Page-level inputs for [`extract_features`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSource<'a> {
    pub host: &'a str,
    pub path_segments: &'a [String],
    pub title: &'a str,
    pub heading: Option<&'a str>,
    pub meta_description: Option<&'a str>,
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Tokenizes free text (titles, headings, path segments).
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|ch| is_word_char(*ch) || *ch == '-' || ch.is_whitespace())
        .collect();

    cleaned
        .split(|ch: char| ch.is_whitespace() || ch == '-')
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Host labels longer than two characters, lowercased.
pub fn tokenize_host(host: &str) -> Vec<String> {
    host.to_lowercase()
        .split('.')
        .filter(|label| label.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

pub fn extract_features(source: FeatureSource<'_>) -> Vec<String> {
    let mut tokens = tokenize_host(source.host);
    for segment in source.path_segments {
        tokens.extend(tokenize(segment));
    }
    tokens.extend(tokenize(source.title));
    if let Some(heading) = source.heading {
        tokens.extend(tokenize(heading));
    }
    if let Some(meta) = source.meta_description {
        tokens.extend(tokenize(meta));
    }
    tokens
}

/// Order-insensitive digest of a token list, for cheap change detection.
///
/// Anagrammed token multisets collide; callers only use it for equality.
pub fn fingerprint(tokens: &[String]) -> String {
    let mut seen = HashSet::new();
    let mut unique: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|token| seen.insert(*token))
        .collect();
    unique.sort_unstable();
    unique.join(FINGERPRINT_DELIMITER)
}
