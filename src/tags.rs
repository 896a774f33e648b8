// src/tags.rs

/// Words that carry no labeling value on their own.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "will", "with",
];

/// Labels applied when a title yields nothing usable.
const FALLBACK_TAGS: &[&str] = &["job", "india", "hiring"];

/// Derive up to five labels from a post title.
///
/// Punctuation is treated as whitespace; stopwords and words of three
/// characters or fewer are dropped; survivors keep their original order.
pub fn generate_tags(title: &str) -> Vec<String> {
    let lowered = title.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let tags: Vec<String> = cleaned
        .split_whitespace()
        .filter(|word| !STOPWORDS.contains(word) && word.len() > 3)
        .take(5)
        .map(|word| word.to_string())
        .collect();

    if tags.is_empty() {
        FALLBACK_TAGS.iter().map(|t| t.to_string()).collect()
    } else {
        tags
    }
}
