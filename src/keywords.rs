// src/keywords.rs
//! Shared keyword primitives: tokenizer, stopword set, title overlap, and
//! search-query construction.
//!
//! Topic-reinforcement scoring and discovery-query building both go through
//! this one implementation. Keeping a single tokenizer (one stopword list,
//! one length cutoff) is what keeps topic judgments consistent across the
//! pipeline — two drifting copies here would be a correctness risk.

use std::collections::HashSet;

use once_cell::sync::Lazy;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "is", "it", "this", "that", "be", "are", "was", "were", "been", "have", "has",
        "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
        "can", "i", "me", "my", "you", "your", "he", "she", "we", "they", "them",
    ]
    .into_iter()
    .collect()
});

/// Lowercase, strip punctuation, split on whitespace, drop stopwords and
/// tokens of ≤2 chars. Order of first appearance is preserved; duplicates
/// are kept (query building wants positional words, overlap dedupes itself).
pub fn tokenize(title: &str) -> Vec<String> {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Count distinct tokens shared by the two titles.
pub fn overlap_count(a: &str, b: &str) -> usize {
    let b_tokens: HashSet<String> = tokenize(b).into_iter().collect();
    let a_tokens: HashSet<String> = tokenize(a).into_iter().collect();
    a_tokens.iter().filter(|t| b_tokens.contains(*t)).count()
}

/// Two titles are topic-related when they share at least two keywords.
pub fn is_related(a: &str, b: &str) -> bool {
    overlap_count(a, b) >= 2
}

/// Build a search query from a noise video's title: the first four content
/// words, plus the bigram of the first two when there is still room for it.
/// Returns `None` when no content words survive — discovery treats that as
/// terminal ("No query") without issuing any external call.
pub fn build_query(title: &str) -> Option<String> {
    let words = tokenize(title);
    if words.is_empty() {
        return None;
    }

    let mut terms: Vec<String> = words.iter().take(4).cloned().collect();
    if words.len() >= 2 {
        let bigram = format!("{} {}", words[0], words[1]);
        if !terms.contains(&bigram) {
            terms.push(bigram);
        }
    }
    terms.truncate(4);

    Some(terms.join(" "))
}
